// Access token endpoints
//
// Token issuance uses BASIC credentials; revocation authenticates with the
// token being revoked.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::auth::Auth;
use crate::client::FitelnetClient;
use crate::error::Error;
use crate::models::TokenInfo;

const TOKEN_PATH: &str = "/api/v1/token";

impl FitelnetClient {
    /// Issue a new access token.
    ///
    /// `POST /api/v1/token` with BASIC auth and no body.
    pub async fn publish_token(
        &self,
        user: &str,
        password: &SecretString,
    ) -> Result<TokenInfo, Error> {
        debug!(user, "publishing access token");
        let auth = Auth::Basic {
            user: user.to_owned(),
            password: password.clone(),
        };
        self.post_json::<TokenInfo, ()>(TOKEN_PATH, &auth, None)
            .await
    }

    /// Revoke an access token.
    ///
    /// `DELETE /api/v1/token/{token}` with BEARER auth using that token.
    pub async fn revoke_token(&self, token: &SecretString) -> Result<(), Error> {
        debug!("revoking access token");
        let url = self.url_with_segment(TOKEN_PATH, token.expose_secret())?;
        let auth = Auth::Bearer {
            token: token.clone(),
        };
        self.delete_url(url, &auth).await
    }
}
