//! mdpress: a static site generator for date-prefixed markdown documents.
//!
//! A directory of `YYYY-MM-DD-name.md` files becomes a navigable HTML
//! site. Subdirectories group documents and inherit the date of their
//! oldest member; every page links to its parent, children, and siblings.
//!
//! # Pipeline
//!
//! ```text
//! docs/ ──walk──▶ tree ──sort──▶ render ──minify──▶ dist/
//!                  │               │
//!                  │               └── templates (theme, minijinja)
//!                  └── naming (filename convention)
//! ```
//!
//! # Module Map
//!
//! | Module      | Responsibility                                      |
//! |-------------|-----------------------------------------------------|
//! | `naming`    | `YYYY-MM-DD-name.md` parsing and title casing       |
//! | `tree`      | document tree: build, dates, sort, navigation       |
//! | `markdown`  | markdown → HTML, outline, excerpt                   |
//! | `templates` | theme execution, template-visible node surface      |
//! | `render`    | tree → one `index.html` per node                    |
//! | `minify`    | conservative html/css/js shrinking                  |
//! | `highlight` | code-block stylesheet generation                    |
//! | `meta`      | `meta.yaml` loading                                 |
//! | `engine`    | build orchestration, asset copying                  |
//! | `serve`     | preview server with rebuild-on-change               |
//! | `scaffold`  | `init` and `create` helpers                         |
//! | `output`    | terminal formatting                                 |

pub mod engine;
pub mod highlight;
pub mod markdown;
pub mod meta;
pub mod minify;
pub mod naming;
pub mod output;
pub mod render;
pub mod scaffold;
pub mod serve;
pub mod templates;
pub mod tree;
