//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::domain::VmlcConfig;
use crate::output::{InstanceRow, OutputContext};

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("vmlc {version}");
    }

    /// Render every profile, marking the active one.
    pub fn render_profiles(&self, config: &VmlcConfig) {
        if config.profiles.is_empty() {
            self.ctx.info("No profiles. Create one: vmlc profile create");
            return;
        }
        for (name, profile) in &config.profiles {
            let active = config.active.as_deref() == Some(name.as_str());
            let marker = if active { "*" } else { " " };
            self.ctx.header(&format!(
                "{} {name}",
                marker.style(self.ctx.styles.success)
            ));
            self.ctx.kv("  project_id:     ", &profile.project_id);
            self.ctx.kv("  zone:           ", &profile.zone);
            self.ctx.kv("  region:         ", &profile.region);
            self.ctx.kv("  instance_name:  ", &profile.instance_name);
            self.ctx.kv("  instance_user:  ", &profile.instance_user);
            self.ctx.kv("  machine_type:   ", &profile.machine_type);
            self.ctx
                .kv("  disk_size:      ", &format!("{} GB", profile.disk_size));
            self.ctx.kv("  image_base_name:", &profile.image_base_name);
        }
    }

    /// Render polling settings and where they are stored.
    pub fn render_config(&self, config: &VmlcConfig, path: &Path) {
        self.ctx.header("Settings:");
        self.ctx.kv(
            "  polling.timeout_secs: ",
            &config.polling.timeout_secs.to_string(),
        );
        self.ctx.kv(
            "  polling.interval_secs:",
            &config.polling.interval_secs.to_string(),
        );
        if !self.ctx.quiet {
            println!();
        }
        self.ctx.kv("Config file:", &path.display().to_string());
        if let Some(active) = &config.active {
            self.ctx.kv("Active profile:", active);
        }
    }

    /// Render the instances of a zone as a table.
    pub fn render_status(&self, project: &str, zone: &str, rows: &[InstanceRow]) {
        if rows.is_empty() {
            self.ctx.info(&format!(
                "No instances in project '{project}', zone '{zone}'."
            ));
            return;
        }
        if self.ctx.quiet {
            return;
        }
        for line in format_status_table(rows) {
            println!("  {line}");
        }
    }
}

/// Plain-text table lines for `vmlc status`, header first.
#[must_use]
pub fn format_status_table(rows: &[InstanceRow]) -> Vec<String> {
    let header = ["NAME", "ZONE", "MACHINE_TYPE", "INTERNAL_IP", "EXTERNAL_IP", "STATUS"];
    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|r| {
            [
                r.name.clone(),
                r.zone.clone(),
                r.machine_type.clone(),
                r.internal_ip.clone().unwrap_or_default(),
                r.external_ip.clone().unwrap_or_default(),
                r.status.clone(),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let render = |cols: &[&str]| {
        cols.iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let mut lines = vec![render(&header)];
    for row in &cells {
        let cols: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(render(&cols));
    }
    lines
}
