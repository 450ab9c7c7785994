use gloo_net::http::Request;
use settings::models::{ApiKey, ModelList};

/// Lists the models an OpenAI compatible endpoint offers.
pub async fn fetch_models(
    base_url: &str,
    api_key: Option<&ApiKey>,
) -> Result<Vec<String>, gloo_net::Error> {
    let url = format!("{}/models", base_url.trim_end_matches('/'));
    let mut request = Request::get(&url);
    if let Some(key) = api_key {
        request = request.header("Authorization", &format!("Bearer {}", key.expose()));
    }

    let response = request.send().await?;
    if !response.ok() {
        return Err(gloo_net::Error::GlooError(format!(
            "{} returned HTTP {}",
            url,
            response.status()
        )));
    }
    let list: ModelList = response.json().await?;
    Ok(list.into_ids())
}
