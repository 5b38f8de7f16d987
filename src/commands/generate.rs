//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Comet;

/// Generate the static site from the content API
pub async fn run(app: &Comet) -> Result<()> {
    let start = std::time::Instant::now();

    if app.config.api.endpoint.is_empty() {
        anyhow::bail!("No API endpoint configured. Set api.endpoint in _config.yml");
    }

    let api = app.api()?;
    let generator = Generator::new(app)?;
    generator.generate(&api).await?;

    let duration = start.elapsed();
    tracing::info!("Completed in {:.2}s", duration.as_secs_f64());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[tokio::test]
    async fn test_generate_requires_an_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = Comet::with_config(SiteConfig::default(), dir.path());

        let err = run(&app).await.unwrap_err();
        assert!(err.to_string().contains("api.endpoint"));
    }
}
