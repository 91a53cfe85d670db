//! blogsmith generator library
//!
//! Static site generation engine for blogsmith.
//!
//! # Modules
//!
//! - [`transform`] - Streaming HTML rewriting for the website variant
//! - [`index`] - Article index, tag aggregation and ordering
//! - [`paginate`] - Index pagination and page naming
//! - [`feed`] - RSS feed assembly
//! - [`links`] - Absolute URL joining
//! - [`template`] - HTML template system with variable interpolation
//! - [`html`] - Page rendering
//! - [`output`] - Output tree cleanup and atomic writes
//! - [`build`] - Build orchestration

pub mod build;
pub mod feed;
pub mod html;
pub mod index;
pub mod links;
pub mod output;
pub mod paginate;
pub mod template;
pub mod transform;

pub use build::{BuildError, BuildFailure, BuildStats, Builder, CheckReport};
pub use feed::{FeedAssembler, FeedError};
pub use html::{HtmlGenerator, NavEntry};
pub use index::{ArticleIndex, IndexedArticle};
pub use paginate::{Page, PageNaming, paginate};
pub use template::{Template, TemplateContext, TemplateRegistry};
pub use transform::{Embed, TransformError, TransformedBody, transform_for_web};
