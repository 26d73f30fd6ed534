// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP facade: routing, request mediation and response rendering.
//!
//! Two routes exist. `POST /signature` stages a document and a PKCS#12
//! bundle, signs, and answers with the base64 of the DER signature (standard
//! alphabet, no line wrapping). `POST /verify` stages a CMS blob and answers
//! with a pretty-printed JSON verdict. Unknown paths 404; other methods on
//! the known paths 405 with an empty body.

use {
    crate::{
        credentials::SigningCredentials,
        signer,
        staging::StagedForm,
        verifier::{self, SignerDetails},
        DocsignError,
    },
    axum::{
        extract::Multipart,
        http::{header, StatusCode},
        response::{IntoResponse, Response},
        routing::post,
        Router,
    },
    log::{error, info},
    serde::Serialize,
    std::path::Path,
    tower_http::cors::{Any, CorsLayer},
};

/// Address the service binds to.
pub const BIND_ADDR: &str = "0.0.0.0:8080";

const MISSING_SIGN_PARAMS: &str = "Missing parameters: file, p12, or password.";
const MISSING_VERIFY_FILE: &str = "Falta o arquivo assinado (campo 'file').";
const SIGNING_FAILED: &str = "Failed to sign document.";
const INTERNAL_ERROR: &str = "Internal server error";

/// Build the application router.
///
/// `/signature` answers with `Access-Control-Allow-Origin: *` for browser
/// callers; `/verify` sets no CORS headers.
pub fn app() -> Router {
    let cors = CorsLayer::new().allow_origin(Any);

    Router::new()
        .route("/signature", post(sign_document).layer(cors))
        .route("/verify", post(verify_signature))
}

/// Run the HTTP server until the process terminates.
pub async fn run() -> Result<(), DocsignError> {
    let listener = tokio::net::TcpListener::bind(BIND_ADDR).await?;
    info!("server listening on {}", BIND_ADDR);

    axum::serve(listener, app()).await?;

    Ok(())
}

/// Body of a `/verify` response.
#[derive(Serialize)]
struct VerifyResponse<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    infos: Option<&'a SignerDetails>,
}

async fn sign_document(mut multipart: Multipart) -> Response {
    let form = match StagedForm::from_multipart(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            error!("signature request error: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response();
        }
    };

    let password = form.value("password").unwrap_or_default().to_string();

    let (document, p12) = match (form.file_path("file"), form.file_path("p12")) {
        (Some(document), Some(p12)) if !password.is_empty() => (document, p12),
        _ => {
            return (StatusCode::BAD_REQUEST, MISSING_SIGN_PARAMS).into_response();
        }
    };

    // Staged inputs are deleted when `form` drops, whatever happens below.
    match sign_staged(document, p12, &password) {
        Ok(der) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain")],
            base64::encode(der),
        )
            .into_response(),
        Err(e) => {
            error!("signing failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, SIGNING_FAILED).into_response()
        }
    }
}

fn sign_staged(document: &Path, p12: &Path, password: &str) -> Result<Vec<u8>, DocsignError> {
    let credentials = SigningCredentials::from_pkcs12_path(p12, password)?;
    let content = std::fs::read(document)?;

    signer::sign_detached(&credentials, &content)
}

async fn verify_signature(mut multipart: Multipart) -> Response {
    let form = match StagedForm::from_multipart(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            error!("verify request error: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response();
        }
    };

    let path = match form.file_path("file") {
        Some(path) => path,
        None => {
            return (StatusCode::BAD_REQUEST, MISSING_VERIFY_FILE).into_response();
        }
    };

    let outcome = match std::fs::read(path) {
        Ok(data) => verifier::verify(&data),
        Err(e) => {
            error!("could not read staged signature: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response();
        }
    };

    let body = VerifyResponse {
        status: outcome.status(),
        infos: outcome.details.as_ref(),
    };

    match serde_json::to_string_pretty(&body) {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response(),
        Err(e) => {
            error!("verify response serialization failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
        }
    }
}
