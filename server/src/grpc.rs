//! gRPC-Interface fuer den Auth-Service (zugang.v1.AuthService)
//!
//! Gleiche Operationen wie die REST-API; die [`FehlerArt`] wird auf
//! `tonic::Code` abgebildet.

use std::{future::Future, net::SocketAddr, sync::Arc};

use anyhow::Result;
use tonic::{metadata::MetadataMap, transport::Server, Request, Response, Status};
use zugang_auth::{AuthError, FehlerArt};

use crate::AuthDienst;

// Generierter Code aus tonic-build
pub mod proto {
    tonic::include_proto!("zugang.v1");
}

use proto::{
    auth_service_server::{AuthService, AuthServiceServer},
    LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, StatusResponse, TokenClaims,
    TokenPair, ValidateTokenRequest,
};

/// gRPC-Status fuer einen Auth-Fehler (nur die oeffentliche Meldung)
pub fn grpc_status(fehler: &AuthError) -> Status {
    let meldung = fehler.oeffentliche_meldung();
    match fehler.art() {
        FehlerArt::Validierung => Status::invalid_argument(meldung),
        FehlerArt::NichtAutorisiert => Status::unauthenticated(meldung),
        FehlerArt::Konflikt => Status::already_exists(meldung),
        FehlerArt::NichtVerfuegbar => Status::unavailable(meldung),
        FehlerArt::Intern => Status::internal(meldung),
    }
}

fn status_aus(fehler: AuthError) -> Status {
    grpc_status(&fehler)
}

/// Bearer-Token aus den gRPC-Metadaten
fn bearer_aus_metadata(metadata: &MetadataMap) -> Option<String> {
    metadata
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

/// Implementierung von zugang.v1.AuthService
pub struct AuthGrpcDienst {
    auth: Arc<AuthDienst>,
}

impl AuthGrpcDienst {
    pub fn neu(auth: Arc<AuthDienst>) -> Self {
        Self { auth }
    }
}

#[tonic::async_trait]
impl AuthService for AuthGrpcDienst {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<StatusResponse>, Status> {
        let body = request.into_inner();
        let user_id = self
            .auth
            .registrieren(&body.email, &body.password)
            .await
            .map_err(status_aus)?;

        Ok(Response::new(StatusResponse {
            status: "ok".into(),
            user_id: user_id.inner(),
        }))
    }

    async fn login(&self, request: Request<LoginRequest>) -> Result<Response<TokenPair>, Status> {
        let body = request.into_inner();
        let paar = self
            .auth
            .anmelden(&body.email, &body.password)
            .await
            .map_err(status_aus)?;

        Ok(Response::new(TokenPair {
            access_token: paar.access_token,
            refresh_token: paar.refresh_token,
        }))
    }

    async fn refresh(&self, request: Request<RefreshRequest>) -> Result<Response<TokenPair>, Status> {
        let paar = self
            .auth
            .erneuern(&request.into_inner().refresh_token)
            .await
            .map_err(status_aus)?;

        Ok(Response::new(TokenPair {
            access_token: paar.access_token,
            refresh_token: paar.refresh_token,
        }))
    }

    async fn logout(
        &self,
        request: Request<LogoutRequest>,
    ) -> Result<Response<StatusResponse>, Status> {
        self.auth
            .abmelden(&request.into_inner().refresh_token)
            .await
            .map_err(status_aus)?;

        Ok(Response::new(StatusResponse {
            status: "ok".into(),
            user_id: 0,
        }))
    }

    async fn validate_token(
        &self,
        request: Request<ValidateTokenRequest>,
    ) -> Result<Response<TokenClaims>, Status> {
        let aus_metadata = bearer_aus_metadata(request.metadata());
        let body = request.into_inner();
        let token = if body.access_token.is_empty() {
            aus_metadata.ok_or_else(|| Status::unauthenticated("Authorization-Metadaten fehlen"))?
        } else {
            body.access_token
        };

        let claims = self.auth.access_token_pruefen(&token).map_err(status_aus)?;
        let user_id = claims
            .user_id()
            .map_err(|e| status_aus(AuthError::AccessToken(e)))?;

        Ok(Response::new(TokenClaims {
            user_id: user_id.inner(),
            jti: claims.jti,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }))
    }
}

/// Startet den gRPC-Server und laeuft bis `shutdown` fertig ist
pub async fn starten(
    adresse: SocketAddr,
    auth: Arc<AuthDienst>,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    tracing::info!(adresse = %adresse, "gRPC-API bereit");

    Server::builder()
        .add_service(AuthServiceServer::new(AuthGrpcDienst::neu(auth)))
        .serve_with_shutdown(adresse, shutdown)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    use crate::testhilfe::test_dienst;

    async fn dienst() -> AuthGrpcDienst {
        AuthGrpcDienst::neu(test_dienst().await)
    }

    fn register(email: &str, password: &str) -> Request<RegisterRequest> {
        Request::new(RegisterRequest {
            email: email.into(),
            password: password.into(),
        })
    }

    fn login(email: &str, password: &str) -> Request<LoginRequest> {
        Request::new(LoginRequest {
            email: email.into(),
            password: password.into(),
        })
    }

    #[tokio::test]
    async fn kompletter_ablauf_ueber_grpc() {
        let d = dienst().await;

        let status = d.register(register("user@example.com", "secret123")).await.unwrap();
        assert_eq!(status.get_ref().status, "ok");
        let user_id = status.get_ref().user_id;
        assert!(user_id > 0);

        let paar = d.login(login("user@example.com", "secret123")).await.unwrap().into_inner();

        let mut anfrage = Request::new(ValidateTokenRequest::default());
        anfrage.metadata_mut().insert(
            "authorization",
            format!("Bearer {}", paar.access_token).parse().unwrap(),
        );
        let claims = d.validate_token(anfrage).await.unwrap().into_inner();
        assert_eq!(claims.user_id, user_id);

        let neu = d
            .refresh(Request::new(RefreshRequest {
                refresh_token: paar.refresh_token.clone(),
            }))
            .await
            .unwrap()
            .into_inner();

        let fehler = d
            .refresh(Request::new(RefreshRequest {
                refresh_token: paar.refresh_token,
            }))
            .await
            .unwrap_err();
        assert_eq!(fehler.code(), Code::Unauthenticated);

        d.logout(Request::new(LogoutRequest {
            refresh_token: neu.refresh_token.clone(),
        }))
        .await
        .unwrap();
        let fehler = d
            .refresh(Request::new(RefreshRequest {
                refresh_token: neu.refresh_token,
            }))
            .await
            .unwrap_err();
        assert_eq!(fehler.code(), Code::Unauthenticated);
    }

    #[tokio::test]
    async fn doppelte_registrierung_ist_already_exists() {
        let d = dienst().await;
        d.register(register("a@example.com", "pw")).await.unwrap();

        let fehler = d.register(register("a@example.com", "pw")).await.unwrap_err();
        assert_eq!(fehler.code(), Code::AlreadyExists);
    }

    #[tokio::test]
    async fn fehlende_eingaben_sind_invalid_argument() {
        let d = dienst().await;
        assert_eq!(
            d.register(register("", "pw")).await.unwrap_err().code(),
            Code::InvalidArgument
        );
        assert_eq!(
            d.register(register("ohne-at", "pw")).await.unwrap_err().code(),
            Code::InvalidArgument
        );
        assert_eq!(
            d.logout(Request::new(LogoutRequest::default()))
                .await
                .unwrap_err()
                .code(),
            Code::InvalidArgument
        );
    }

    #[tokio::test]
    async fn falsches_passwort_ist_unauthenticated() {
        let d = dienst().await;
        d.register(register("da@example.com", "richtig")).await.unwrap();

        let falsch = d.login(login("da@example.com", "falsch")).await.unwrap_err();
        let unbekannt = d.login(login("weg@example.com", "richtig")).await.unwrap_err();
        assert_eq!(falsch.code(), Code::Unauthenticated);
        assert_eq!(falsch.message(), unbekannt.message());
    }

    #[tokio::test]
    async fn validate_token_ohne_token_ist_unauthenticated() {
        let d = dienst().await;
        let fehler = d
            .validate_token(Request::new(ValidateTokenRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(fehler.code(), Code::Unauthenticated);

        let fehler = d
            .validate_token(Request::new(ValidateTokenRequest {
                access_token: "kein.token".into(),
            }))
            .await
            .unwrap_err();
        assert_eq!(fehler.code(), Code::Unauthenticated);
    }

    #[test]
    fn fehlerarten_auf_codes() {
        assert_eq!(grpc_status(&AuthError::Zeitlimit("x")).code(), Code::Unavailable);
        assert_eq!(grpc_status(&AuthError::intern("geheim")).code(), Code::Internal);
        assert_eq!(grpc_status(&AuthError::intern("geheim")).message(), "Interner Fehler");
        assert_eq!(grpc_status(&AuthError::EmailVergeben).code(), Code::AlreadyExists);
    }
}
