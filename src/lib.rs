//! TikTok Downloader Bot Library
//!
//! A Telegram bot and web service for downloading TikTok videos.
//!
//! This crate provides the core functionality for:
//! - Receiving Telegram updates over a webhook
//! - Extracting watermark-free videos via ssstik.io
//! - Tracking users and download attempts in Supabase (with an in-memory
//!   fallback)
//! - Serving a stats dashboard and JSON stats API

pub mod bot;
pub mod config;
pub mod downloader;
pub mod server;
pub mod storage;
pub mod telegram;
