pub mod config;
pub mod dryrun;
pub mod gemini;
pub mod orchestrator;
pub mod prompts;
pub mod service;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use fitroom_contracts::assets::{intake_path, parse_data_url, ImageData};
use fitroom_contracts::events::{EventPayload, EventWriter};
use fitroom_contracts::gallery::GALLERY_STORAGE_KEY;
use fitroom_contracts::storage::{KeyedStore, LocalStorage};
use fitroom_contracts::studio::{InspireTarget, Settled, Slot, Studio, Ticket};
use fitroom_contracts::theme::{Theme, THEME_STORAGE_KEY};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

pub use config::EngineConfig;
pub use dryrun::DryrunService;
pub use gemini::GeminiService;
pub use orchestrator::run_variations;
pub use service::{ServiceRegistry, TryOnService};

pub fn default_service_registry(config: &EngineConfig) -> ServiceRegistry {
    let mut services = ServiceRegistry::new();
    services.register(DryrunService);
    services.register(GeminiService::new(config));
    services
}

/// File name used for the `index`-th (0-based) downloaded image.
pub fn download_file_name(index: usize) -> String {
    format!("virtual-try-on-{}.png", index + 1)
}

/// A studio session wired to a generation service and an event log.
///
/// Each action runs its `begin_*` transition, performs the blocking service
/// call and applies the outcome through the matching `finish_*`. Service
/// failures end up in the studio banner, not in the returned `Result`.
pub struct StudioEngine {
    studio: Studio,
    service: Box<dyn TryOnService>,
    events: EventWriter,
}

impl StudioEngine {
    pub fn new(studio: Studio, service: Box<dyn TryOnService>, events: EventWriter) -> Result<Self> {
        events.emit(
            "session_started",
            payload(json!({
                "service": service.name(),
                "gallery_entries": studio.gallery().len(),
                "theme": studio.theme().as_str(),
            })),
        )?;
        Ok(Self {
            studio,
            service,
            events,
        })
    }

    /// Session backed by `storage.json` and `events.jsonl` under the data dir.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("failed to create {}", config.data_dir.display()))?;
        let storage = LocalStorage::new(config.storage_path());
        let studio = Studio::new(
            Box::new(KeyedStore::<Vec<String>>::new(
                storage.clone(),
                GALLERY_STORAGE_KEY,
            )),
            Box::new(KeyedStore::<Theme>::new(storage, THEME_STORAGE_KEY)),
        );
        let registry = default_service_registry(config);
        let available = registry.names().join(", ");
        let service = registry
            .take(&config.provider)
            .ok_or_else(|| anyhow!("unknown provider '{}' (available: {available})", config.provider))?;
        let session_id = uuid::Uuid::new_v4().to_string();
        let events = EventWriter::new(config.events_path(), session_id);
        Self::new(studio, service, events)
    }

    pub fn studio(&self) -> &Studio {
        &self.studio
    }

    pub fn studio_mut(&mut self) -> &mut Studio {
        &mut self.studio
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Returns `false` when the file is not an image and was ignored.
    pub fn upload_face(&mut self, path: &Path) -> Result<bool> {
        let Some(asset) = intake_path(path)? else {
            return Ok(false);
        };
        self.studio.set_face(asset);
        Ok(true)
    }

    pub fn upload_product(&mut self, path: &Path) -> Result<bool> {
        let Some(asset) = intake_path(path)? else {
            return Ok(false);
        };
        let call = self.studio.begin_product_upload(asset)?;
        self.emit_in_flight(
            "product_render_started",
            payload(json!({ "product": fingerprint(&call.product) })),
        );
        let outcome = self.service.render_product(&call.product);
        match &outcome {
            Ok(rendered) => self.emit_in_flight(
                "product_render_finished",
                payload(json!({ "rendered": fingerprint(&ImageData::png(rendered.as_str())) })),
            ),
            Err(err) => self.emit_in_flight(
                "product_render_failed",
                payload(json!({ "error": err.to_string() })),
            ),
        }
        let settled = self.studio.finish_product_render(call.ticket, outcome);
        self.record_settled(call.ticket, settled)?;
        Ok(true)
    }

    pub fn approve_product(&mut self) -> Result<()> {
        self.studio.approve_product()?;
        self.events.emit("product_approved", EventPayload::new())?;
        tracing::info!("product approved");
        Ok(())
    }

    pub fn reset_product(&mut self) -> Result<()> {
        let previous = self.studio.product_status();
        self.studio.reset_product();
        self.events.emit(
            "product_reset",
            payload(json!({ "from": previous.as_str() })),
        )?;
        Ok(())
    }

    /// Uploads a pose reference and asks the service to describe it.
    pub fn upload_pose(&mut self, path: &Path) -> Result<bool> {
        let Some(asset) = intake_path(path)? else {
            return Ok(false);
        };
        let call = self.studio.begin_pose_upload(asset)?;
        let outcome = self.service.describe_pose(&call.image);
        let described = outcome.is_ok();
        let settled = self.studio.finish_pose_description(call.ticket, outcome);
        self.record_settled(call.ticket, settled)?;
        if settled == Settled::Applied {
            self.events.emit(
                "pose_described",
                payload(json!({
                    "pose": fingerprint(&call.image),
                    "described": described,
                })),
            )?;
        }
        Ok(true)
    }

    pub fn upload_background(&mut self, path: &Path) -> Result<bool> {
        let Some(asset) = intake_path(path)? else {
            return Ok(false);
        };
        self.studio.set_background_image(asset);
        Ok(true)
    }

    pub fn inspire(&mut self, target: InspireTarget) -> Result<()> {
        let call = self.studio.begin_inspire(target)?;
        let outcome = match target {
            InspireTarget::Pose => self.service.creative_pose(&call.product),
            InspireTarget::Background => self.service.creative_background(&call.product),
        };
        let succeeded = outcome.is_ok();
        let settled = self.studio.finish_inspire(&call, outcome);
        self.record_settled(call.ticket, settled)?;
        if settled == Settled::Applied {
            self.events.emit(
                "inspire_finished",
                payload(json!({
                    "target": target.as_str(),
                    "succeeded": succeeded,
                })),
            )?;
        }
        Ok(())
    }

    /// Runs one batch. Returns the number of images now shown.
    pub fn generate(&mut self) -> Result<usize> {
        let call = self.studio.begin_generation()?;
        let total = call.requests.len();
        self.emit_in_flight(
            "generation_started",
            payload(json!({
                "variations": total,
                "service": self.service.name(),
            })),
        );
        let outcome = run_variations(self.service.as_ref(), &call.requests);
        match &outcome {
            Ok(images) => {
                self.emit_in_flight(
                    "generation_finished",
                    payload(json!({
                        "images": images
                            .iter()
                            .map(|image| fingerprint(&ImageData::png(image.as_str())))
                            .collect::<Vec<String>>(),
                    })),
                );
                tracing::info!(images = images.len(), "generation finished");
            }
            Err(err) => {
                self.emit_in_flight(
                    "generation_failed",
                    payload(json!({ "variations": total, "error": err.to_string() })),
                );
            }
        }
        let settled = self.studio.finish_generation(call.ticket, outcome);
        self.record_settled(call.ticket, settled)?;
        Ok(self.studio.results().map(<[String]>::len).unwrap_or(0))
    }

    /// Returns `false` when the result was already saved.
    pub fn save_result(&mut self, index: usize) -> Result<bool> {
        let saved = self.studio.save_result(index)?;
        if saved {
            self.events.emit(
                "gallery_saved",
                payload(json!({
                    "index": index,
                    "gallery_entries": self.studio.gallery().len(),
                })),
            )?;
        }
        Ok(saved)
    }

    pub fn download_result(&self, index: usize, dir: &Path) -> Result<PathBuf> {
        let url = self.studio.result(index)?;
        let path = write_data_url_png(url, dir, index)?;
        self.events.emit(
            "result_downloaded",
            payload(json!({ "index": index, "path": path.to_string_lossy() })),
        )?;
        Ok(path)
    }

    pub fn export_gallery_entry(&self, index: usize, dir: &Path) -> Result<PathBuf> {
        let Some(url) = self.studio.gallery().entries().get(index) else {
            bail!("no gallery entry at position {}", index + 1);
        };
        write_data_url_png(url, dir, index)
    }

    // Between `begin_*` and `finish_*` a failed log write must not skip the finish.
    fn emit_in_flight(&self, event_type: &str, event: EventPayload) {
        if let Err(err) = self.events.emit(event_type, event) {
            tracing::warn!(event_type, error = %err, "failed to record session event");
        }
    }

    fn record_settled(&self, ticket: Ticket, settled: Settled) -> Result<()> {
        if settled == Settled::Stale {
            self.events.emit(
                "stale_result_discarded",
                payload(json!({
                    "slot": slot_name(ticket.slot),
                    "token": ticket.token,
                })),
            )?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for StudioEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioEngine")
            .field("studio", &self.studio)
            .field("service", &self.service.name())
            .field("session_id", &self.events.session_id())
            .finish()
    }
}

fn write_data_url_png(url: &str, dir: &Path, index: usize) -> Result<PathBuf> {
    let data = parse_data_url(url).ok_or_else(|| anyhow!("image is not a base64 data URL"))?;
    let bytes = data.decode().context("image base64 decode failed")?;
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(download_file_name(index));
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn slot_name(slot: Slot) -> &'static str {
    match slot {
        Slot::ProductRender => "product_render",
        Slot::PoseDescription => "pose_description",
        Slot::Inspire => "inspire",
        Slot::Generation => "generation",
    }
}

fn fingerprint(data: &ImageData) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.mime_type.as_bytes());
    hasher.update(data.base64.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}

fn payload(value: Value) -> EventPayload {
    value.as_object().cloned().unwrap_or_default()
}
