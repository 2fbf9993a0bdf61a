use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::comments::{dtos as comments_dtos, handlers as comments_handlers};
use crate::features::dogs::{
    dtos as dogs_dtos, handlers as dogs_handlers, models as dogs_models,
};
use crate::features::statuses::{dtos as statuses_dtos, handlers as statuses_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::refresh_token,
        auth::handlers::logout,
        auth::handlers::get_me,
        // Dog reports
        dogs_handlers::list_dog_reports,
        dogs_handlers::create_dog_report,
        dogs_handlers::get_dog_report,
        dogs_handlers::replace_dog_report,
        dogs_handlers::update_dog_report,
        dogs_handlers::delete_dog_report,
        // Statuses
        statuses_handlers::list_statuses,
        statuses_handlers::create_status,
        statuses_handlers::get_status,
        statuses_handlers::replace_status,
        statuses_handlers::update_status,
        statuses_handlers::delete_status,
        // Comments
        comments_handlers::list_comments,
        comments_handlers::create_comment,
        comments_handlers::get_comment,
        comments_handlers::replace_comment,
        comments_handlers::update_comment,
        comments_handlers::delete_comment,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::RegisterRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::RefreshTokenRequestDto,
            auth::dtos::LogoutRequestDto,
            auth::dtos::UserDto,
            auth::dtos::AuthResponseDto,
            auth::dtos::RefreshTokenResponseDto,
            auth::dtos::LogoutResponseDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            ApiResponse<auth::dtos::RefreshTokenResponseDto>,
            ApiResponse<auth::dtos::LogoutResponseDto>,
            ApiResponse<auth::dtos::UserDto>,
            // Dog reports
            dogs_models::DogCondition,
            dogs_dtos::DogReportPayload,
            dogs_dtos::DogReportForm,
            dogs_dtos::DogReportResponseDto,
            ApiResponse<dogs_dtos::DogReportResponseDto>,
            ApiResponse<Vec<dogs_dtos::DogReportResponseDto>>,
            // Statuses
            statuses_dtos::CreateStatusDto,
            statuses_dtos::UpdateStatusDto,
            statuses_dtos::DogStatusDto,
            ApiResponse<statuses_dtos::DogStatusDto>,
            ApiResponse<Vec<statuses_dtos::DogStatusDto>>,
            // Comments
            comments_dtos::CreateCommentDto,
            comments_dtos::UpdateCommentDto,
            comments_dtos::CommentResponseDto,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<Vec<comments_dtos::CommentResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and tokens"),
        (name = "dogs", description = "Stray dog reports (anonymous submissions allowed)"),
        (name = "status", description = "Welfare status of a reported dog"),
        (name = "comments", description = "Comments on dog reports"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Strayline API",
        version = "0.1.0",
        description = "Crowdsourced stray dog welfare reporting",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer JWT security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/register",
            "/api/auth/logout",
            "/api/dogs",
            "/api/dogs/{id}",
            "/api/status",
            "/api/status/{id}",
            "/api/comments",
            "/api/comments/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("DogCondition"));
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Custom".to_string(),
            version: "9.9.9".to_string(),
            description: "desc".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Custom");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
