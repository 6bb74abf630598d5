//! Calls an API with the authentication configured in the environment.
//!
//! ```sh
//! IS_AUTH=true AUTH_TYPE=oauth2 \
//! OAUTH2_CLIENT_ID=my-client OAUTH2_CLIENT_SECRET=my-secret \
//! OAUTH2_TOKEN_URL=https://auth.example.com/oauth/token \
//! API_URL=https://api.example.com/users \
//! cargo run --example client_credentials
//! ```

use apitest_auth::{AuthSettings, RequestAuth, apply_authentication};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let url = std::env::var("API_URL").unwrap_or_else(|_| "https://httpbin.org/anything".to_string());

    let settings = AuthSettings::from_env();
    let mut auth = RequestAuth::new();
    let outcome = apply_authentication(&settings, &mut auth).await?;
    tracing::info!(?outcome, "authentication resolved");

    let client = reqwest::Client::new();
    let request = client.get(&url).build()?;
    let response = auth.execute(&client, request).await?;

    let status = response.status();
    let body = response.text().await?;
    tracing::info!(%status, %url, "response received");
    println!("{body}");

    Ok(())
}
