//! CLI route: single route table and run context. Dispatches to the studio and presentation.

use crate::assets::{AssetStore, DirectoryAssetStore};
use crate::config::{ConfigLoader, StudioConfig};
use crate::credentials::{CredentialProvider, EnvCredentials};
use crate::error::StudioError;
use crate::generation::image::decode_data_url;
use crate::studio::{Studio, StudioSnapshot};
use crate::types::{LifecycleState, MediaKind, ProductDetails};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_config_json, format_config_toml, format_prompts_json, format_prompts_text,
    format_render_json, format_render_text, RenderReport,
};

/// Runtime context for CLI execution: workspace, loaded config, credentials and the async
/// runtime the studio runs on. Built from workspace path and optional config path using
/// ConfigLoader only.
pub struct RunContext {
    runtime: tokio::runtime::Runtime,
    config: StudioConfig,
    credentials: Arc<EnvCredentials>,
    workspace_root: PathBuf,
    interactive: bool,
}

impl RunContext {
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        interactive: bool,
    ) -> Result<Self, StudioError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };

        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| StudioError::ProviderError(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            runtime,
            config,
            credentials: Arc::new(EnvCredentials::from_env(interactive)),
            workspace_root,
            interactive,
        })
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, StudioError> {
        let started = Instant::now();
        let result = match command {
            Commands::Prompts {
                name,
                description,
                format,
            } => self.handle_prompts(ProductDetails::new(name.as_str(), description.as_str()), format),
            Commands::Render {
                name,
                description,
                yes,
                out,
                format,
            } => self.handle_render(
                ProductDetails::new(name.as_str(), description.as_str()),
                *yes,
                out.as_deref(),
                format,
            ),
            Commands::Key => self.handle_key(),
            Commands::Config { format } => self.handle_config(format),
        };
        info!(
            command = command.name(),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn output_dir(&self, out: Option<&Path>) -> PathBuf {
        let dir = out
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.output.dir.clone());
        if dir.is_absolute() {
            dir
        } else {
            self.workspace_root.join(dir)
        }
    }

    fn studio(&self, out_dir: &Path) -> Result<Studio, StudioError> {
        let mut config = self.config.clone();
        config.output.dir = out_dir.to_path_buf();
        let credentials: Arc<dyn CredentialProvider> = self.credentials.clone();
        Studio::from_config(&config, credentials)
    }

    fn handle_prompts(&self, product: ProductDetails, format: &str) -> Result<String, StudioError> {
        let studio = self.studio(&self.output_dir(None))?;
        let prompts = self.runtime.block_on(studio.submit(product.clone()))?;
        match format {
            "json" => format_prompts_json(&product, &prompts),
            _ => Ok(format_prompts_text(&product, &prompts)),
        }
    }

    fn handle_render(
        &self,
        product: ProductDetails,
        yes: bool,
        out: Option<&Path>,
        format: &str,
    ) -> Result<String, StudioError> {
        let out_dir = self.output_dir(out);
        let studio = self.studio(&out_dir)?;
        let prompts = self.runtime.block_on(studio.submit(product.clone()))?;

        if !yes && self.interactive {
            eprintln!("{}", format_prompts_text(&product, &prompts));
            let confirmed = dialoguer::Confirm::new()
                .with_prompt("Render image and video with these prompts?")
                .default(true)
                .interact()
                .map_err(|e| StudioError::InvalidInput(format!("Failed to get user input: {}", e)))?;
            if !confirmed {
                return Ok("Render cancelled".to_string());
            }
        }

        let watcher = self.runtime.spawn(follow_video_status(studio.subscribe(), |text| {
            eprintln!("  {}", text.dimmed());
        }));

        let media = match self.runtime.block_on(studio.render()) {
            Ok(media) => {
                // Completed is the last change published, so the watcher ends on its own.
                if let Err(e) = self.runtime.block_on(watcher) {
                    warn!(error = %e, "Status watcher ended abnormally");
                }
                media
            }
            Err(e) => {
                watcher.abort();
                return Err(e);
            }
        };

        let image = media
            .image_url
            .as_deref()
            .map(|url| self.runtime.block_on(persist_image(url, &out_dir)));

        let snapshot = studio.snapshot();
        let report = RenderReport {
            product,
            prompts,
            state: snapshot.state,
            image,
            video: media.video_url,
            error: snapshot.error,
        };
        match format {
            "json" => format_render_json(&report),
            _ => Ok(format_render_text(&report)),
        }
    }

    fn handle_key(&self) -> Result<String, StudioError> {
        let had_key = self.runtime.block_on(self.credentials.has_credential());
        self.runtime.block_on(self.credentials.request_credential())?;
        Ok(if had_key {
            "API key replaced for this session".to_string()
        } else {
            "API key selected for this session".to_string()
        })
    }

    fn handle_config(&self, format: &str) -> Result<String, StudioError> {
        let has_credential = self.runtime.block_on(self.credentials.has_credential());
        match format {
            "json" => format_config_json(&self.config, has_credential),
            _ => format_config_toml(&self.config, has_credential),
        }
    }
}

/// Emit each distinct video status until the cycle completes or the studio is dropped.
async fn follow_video_status<F>(mut updates: watch::Receiver<StudioSnapshot>, mut emit: F)
where
    F: FnMut(&str),
{
    let mut last: Option<String> = None;
    loop {
        let (status, state) = {
            let snap = updates.borrow_and_update();
            (snap.video_status.clone(), snap.state)
        };
        if status != last {
            if let Some(ref text) = status {
                emit(text);
            }
            last = status;
        }
        if state == LifecycleState::Completed || updates.changed().await.is_err() {
            break;
        }
    }
}

/// Write an inline image next to the video; the data URL is kept when writing fails.
async fn persist_image(url: &str, out_dir: &Path) -> String {
    let Some(asset) = decode_data_url(url) else {
        return url.to_string();
    };
    match DirectoryAssetStore::new(out_dir).store(MediaKind::Image, asset).await {
        Ok(file_url) => file_url,
        Err(e) => {
            warn!(error = %e, "Failed to write image asset");
            url.to_string()
        }
    }
}
