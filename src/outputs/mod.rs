//! Output generation: the HTML fragment, the published page, and the JSON export.
//!
//! # Submodules
//!
//! - [`html`]: Renders the sorted article list into an HTML fragment
//! - [`template`]: Substitutes the fragment into the template and writes the page
//! - [`json`]: Optional JSON dump of the same article list
//!
//! # Output Structure
//!
//! ```text
//! template.html  --(placeholder replaced)-->  index.html
//!                                             news.json   (optional)
//! ```

pub mod html;
pub mod json;
pub mod template;
