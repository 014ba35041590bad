//! Lumen Notes - Main Library
//!
//! Lumen is a multi-tenant note-taking backend with a social layer: folders
//! and smart folders, tags, templates, password-sealed notes, direct and
//! group chat with a live SSE feed, follows and fireflies, plus a coin
//! economy with daily tasks, streaks, and a public rating board.
//!
//! # Module Structure
//!
//! - **`auth`** - Users, JWT sessions, and the register/login/me handlers
//! - **`notes`** - Note CRUD, pin/archive, templates, encryption
//! - **`folders`** - Folder hierarchy and smart folders
//! - **`tags`** - Tagging, the tag cloud, autocomplete
//! - **`templates`** - The template catalog
//! - **`chat`** - Rooms, messages, read tracking, SSE subscriptions
//! - **`realtime`** - Per-room broadcast channels
//! - **`social`** - Profiles, follows, fireflies, settings
//! - **`gamification`** - Coins, tasks, streaks, statistics, ratings
//! - **`marketplace`** - Item listings and purchases
//! - **`server`** - Configuration, shared state, app assembly
//! - **`routes`** - HTTP route wiring
//! - **`middleware`** - JWT authentication middleware
//! - **`error`** - The API error type

pub mod auth;
pub mod chat;
pub mod error;
pub mod folders;
pub mod gamification;
pub mod marketplace;
pub mod middleware;
pub mod notes;
pub mod realtime;
pub mod routes;
pub mod server;
pub mod social;
pub mod tags;
pub mod templates;
