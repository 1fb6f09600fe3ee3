//! TikTok video extraction module.
//!
//! Wraps the ssstik.io extraction flow behind a small client. The rest of
//! the service treats this as an opaque collaborator: a TikTok URL goes
//! in, a downloaded video file or an error comes out.

mod ssstik;

pub use ssstik::{DownloadError, DownloadedVideo, SsstikClient};
