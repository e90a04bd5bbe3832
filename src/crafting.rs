//! Crafting job state for the vox widget. One [`JobState`] mirrors what the
//! targeted vox is doing; status query responses are absorbed wholesale and
//! the configuration setters cover everything the widget can change before a
//! job starts. Starting and canceling a job are server commands with no local
//! state of their own, so they have no methods here.

use log;
use serde::{Deserialize, Serialize};

use crate::models::ItemInstanceId;

// --- Job vocabulary ---

/// What the vox reports itself doing. Server strings parse case-insensitively
/// and anything unrecognized lands on `Unknown` so a new server state cannot
/// break the widget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoxJobStatus {
    #[default]
    Unknown,
    Idle,
    Configuring,
    Running,
    Finished,
}

impl VoxJobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "idle" => VoxJobStatus::Idle,
            "configuring" => VoxJobStatus::Configuring,
            "running" => VoxJobStatus::Running,
            "finished" => VoxJobStatus::Finished,
            "" | "unknown" => VoxJobStatus::Unknown,
            other => {
                log::debug!("[Crafting] Unrecognized vox status {:?}", other);
                VoxJobStatus::Unknown
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoxJobStatus::Unknown => "unknown",
            VoxJobStatus::Idle => "idle",
            VoxJobStatus::Configuring => "configuring",
            VoxJobStatus::Running => "running",
            VoxJobStatus::Finished => "finished",
        }
    }
}

/// The kinds of work a vox can be set up for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobType {
    Make,
    Shape,
    Grind,
    Purify,
    Repair,
    Salvage,
    Block,
}

impl JobType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "make" => Some(JobType::Make),
            "shape" => Some(JobType::Shape),
            "grind" => Some(JobType::Grind),
            "purify" => Some(JobType::Purify),
            "repair" => Some(JobType::Repair),
            "salvage" => Some(JobType::Salvage),
            "block" => Some(JobType::Block),
            "" => None,
            other => {
                log::debug!("[Crafting] Unrecognized job type {:?}", other);
                None
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Make => "make",
            JobType::Shape => "shape",
            JobType::Grind => "grind",
            JobType::Purify => "purify",
            JobType::Repair => "repair",
            JobType::Salvage => "salvage",
            JobType::Block => "block",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Recipe {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Template {
    pub id: String,
    pub name: String,
}

/// An item loaded (or loadable) into the vox, with how many units of it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Ingredient {
    pub id: ItemInstanceId,
    pub name: String,
    pub qty: u32,
}

/// Last thing the vox said, kept for the widget's message line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxMessage {
    pub text: String,
    pub is_error: bool,
}

// --- Status query payload ---

/// Vox status as the status query reports it. Fields the server omits fall
/// back to empty so a partial report still applies cleanly.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct VoxStatusReport {
    pub vox: Option<String>,
    pub status: String,
    pub ready: bool,
    #[serde(rename = "type")]
    pub job_type: String,
    pub started: Option<String>,
    pub endin: Option<String>,
    pub recipe: Option<Recipe>,
    pub template: Option<Template>,
    pub ingredients: Vec<Ingredient>,
    pub name: Option<String>,
}

// --- Job state ---

/// Everything the crafting widget shows about the targeted vox.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobState {
    /// Still waiting for the first status response.
    pub loading: bool,
    pub vox_id: Option<String>,
    pub status: VoxJobStatus,
    /// Output is finished and waiting to be collected.
    pub ready: bool,
    pub job_type: Option<JobType>,
    /// Server timestamp of when the running job started.
    pub started: Option<String>,
    /// Time remaining, as the server formats it.
    pub end_in: Option<String>,
    pub recipe: Option<Recipe>,
    pub template: Option<Template>,
    pub quality: Option<f32>,
    pub possible_ingredients: Vec<Ingredient>,
    pub ingredients: Vec<Ingredient>,
    pub name: Option<String>,
    pub message: Option<VoxMessage>,
    pub count: Option<u32>,
}

impl JobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_job_type(&mut self, job_type: JobType) {
        self.job_type = Some(job_type);
    }

    pub fn set_count(&mut self, count: u32) {
        self.count = Some(count);
    }

    pub fn set_recipe(&mut self, recipe: Recipe) {
        self.recipe = Some(recipe);
    }

    pub fn set_template(&mut self, template: Template) {
        self.template = Some(template);
    }

    pub fn set_quality(&mut self, quality: f32) {
        self.quality = Some(quality);
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn set_message(&mut self, message: VoxMessage) {
        self.message = Some(message);
    }

    pub fn set_possible_ingredients(&mut self, possible: Vec<Ingredient>) {
        self.possible_ingredients = possible;
    }

    pub fn add_ingredient(&mut self, ingredient: Ingredient) {
        self.ingredients.push(ingredient);
    }

    pub fn remove_ingredient(&mut self, ingredient_id: &str) {
        self.ingredients.retain(|ingredient| ingredient.id != ingredient_id);
    }

    /// Drops the configured job and leaves the vox idle. The vox binding
    /// itself survives, clearing a job does not walk away from the station.
    pub fn clear_job(&mut self) {
        let vox_id = self.vox_id.take();
        *self = JobState { vox_id, status: VoxJobStatus::Idle, ..JobState::default() };
    }

    /// Collecting the finished output also clears the job.
    pub fn collect_job(&mut self) {
        self.clear_job();
    }

    /// Absorbs a full status response, vox binding included.
    pub fn got_status(&mut self, report: &VoxStatusReport) {
        if report.vox.is_some() {
            self.vox_id = report.vox.clone();
        }
        self.apply_status(report);
        log::info!(
            "[Crafting] Vox {} is {}",
            self.vox_id.as_deref().unwrap_or("<unbound>"),
            self.status.as_str()
        );
    }

    /// Like [`got_status`](Self::got_status) but keeps the current vox
    /// binding, for refreshes that do not name the vox again.
    pub fn update_status(&mut self, report: &VoxStatusReport) {
        self.apply_status(report);
    }

    fn apply_status(&mut self, report: &VoxStatusReport) {
        self.status = VoxJobStatus::parse(&report.status);
        self.ready = report.ready;
        self.job_type = JobType::parse(&report.job_type);
        self.started = report.started.clone();
        self.end_in = report.endin.clone();
        self.recipe = report.recipe.clone();
        self.template = report.template.clone();
        self.name = report.name.clone();
        self.ingredients = report.ingredients.clone();
        self.loading = false;
    }
}
