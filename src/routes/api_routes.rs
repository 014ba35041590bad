//! API Route Handlers
//!
//! Protected REST endpoints for notes, folders, tags, templates, social,
//! gamification, and the marketplace. Every route in this group requires a
//! valid `Authorization: Bearer` token.

use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::auth::handlers::{get_me, logout};
use crate::folders::handlers as folders;
use crate::gamification::handlers as gamification;
use crate::marketplace::handlers as marketplace;
use crate::middleware::auth::auth_middleware;
use crate::notes::handlers as notes;
use crate::server::state::AppState;
use crate::social::handlers as social;
use crate::tags::handlers as tags;
use crate::templates::handlers as templates;

/// Configure the protected API routes.
pub fn configure_api_routes(router: Router<AppState>, app_state: AppState) -> Router<AppState> {
    let protected = Router::new()
        // Session
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(get_me))
        // Notes
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/api/notes/{note_id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/api/notes/{note_id}/pin", post(notes::toggle_pin))
        .route("/api/notes/{note_id}/archive", post(notes::toggle_archive))
        .route("/api/notes/from-template", post(notes::create_from_template))
        .route("/api/notes/{note_id}/encrypt", post(notes::encrypt_note))
        .route("/api/notes/{note_id}/decrypt", post(notes::decrypt_note))
        .route(
            "/api/notes/{note_id}/encryption",
            delete(notes::remove_encryption),
        )
        // Folders
        .route(
            "/api/folders",
            get(folders::list_folders).post(folders::create_folder),
        )
        .route("/api/folders/tree", get(folders::folder_tree))
        .route(
            "/api/folders/{folder_id}",
            get(folders::get_folder)
                .put(folders::update_folder)
                .delete(folders::delete_folder),
        )
        .route(
            "/api/folders/{folder_id}/favorite",
            post(folders::toggle_favorite),
        )
        .route("/api/folders/{folder_id}/notes", get(folders::folder_notes))
        // Tags
        .route("/api/tags", get(tags::list_tags).post(tags::create_tag))
        .route("/api/tags/cloud", get(tags::tag_cloud))
        .route("/api/tags/autocomplete", get(tags::autocomplete))
        .route("/api/tags/statistics", get(tags::tag_statistics))
        .route(
            "/api/tags/{tag_id}",
            put(tags::update_tag).delete(tags::delete_tag),
        )
        // Templates
        .route("/api/templates", get(templates::list_templates))
        .route("/api/templates/categories", get(templates::list_categories))
        .route("/api/templates/{template_id}", get(templates::get_template))
        // Profiles and follows
        .route("/api/profiles/me", put(social::update_my_profile))
        .route("/api/profiles/search", get(social::search_profiles))
        .route("/api/profiles/{username}", get(social::get_profile))
        .route("/api/profiles/{username}/follow", post(social::follow_user))
        .route(
            "/api/profiles/{username}/unfollow",
            post(social::unfollow_user),
        )
        .route(
            "/api/profiles/{username}/followers",
            get(social::list_followers),
        )
        .route(
            "/api/profiles/{username}/following",
            get(social::list_following),
        )
        .route("/api/profiles/{username}/notes", get(social::list_user_notes))
        // Fireflies
        .route(
            "/api/fireflies",
            get(social::list_fireflies).post(social::send_firefly),
        )
        // Settings
        .route(
            "/api/settings",
            get(social::get_settings).put(social::update_settings),
        )
        // Gamification
        .route("/api/currency", get(gamification::get_balance))
        .route("/api/currency/earn", post(gamification::earn))
        .route(
            "/api/currency/transactions",
            get(gamification::list_transactions),
        )
        .route("/api/tasks", get(gamification::list_daily_tasks))
        .route(
            "/api/tasks/{task_id}/complete",
            post(gamification::complete_task),
        )
        .route("/api/streak", get(gamification::get_streak))
        .route("/api/streak/check", post(gamification::check_streak))
        .route("/api/statistics", get(gamification::get_statistics))
        .route("/api/rating", get(gamification::rating_board))
        .route("/api/rating/me", get(gamification::get_my_rating))
        // Marketplace
        .route(
            "/api/marketplace",
            get(marketplace::browse).post(marketplace::upload_item),
        )
        .route("/api/marketplace/purchases", get(marketplace::my_purchases))
        .route("/api/marketplace/{item_id}", get(marketplace::get_item))
        .route(
            "/api/marketplace/{item_id}/purchase",
            post(marketplace::purchase),
        )
        .route_layer(from_fn_with_state(app_state, auth_middleware));

    router.merge(protected)
}
