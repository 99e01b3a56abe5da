use sdkforge_core::{AppViewModel, Endpoint, JobHandle, Phase, RateLimit};

/// Turns successive view models into terminal output, printing only what changed.
#[derive(Debug, Default)]
pub struct Renderer {
    previous: AppViewModel,
}

impl Renderer {
    pub fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let prev = &self.previous;
        let mut lines = Vec::new();

        if view.phase != prev.phase
            || job_id(view) != job_id(prev)
            || job_status(view) != job_status(prev)
        {
            lines.push(phase_line(view));
        }

        let fresh_logs = if view.logs.len() >= prev.logs.len() && job_id(view) == job_id(prev) {
            &view.logs[prev.logs.len()..]
        } else {
            &view.logs[..]
        };
        lines.extend(fresh_logs.iter().map(|line| format!("  | {line}")));

        if view.phase == Phase::Review && prev.phase != Phase::Review {
            lines.extend(endpoint_lines(view));
            lines.extend(suggestion_lines(view));
        } else if view.phase == Phase::Review
            && (view.endpoint_count != prev.endpoint_count || view.endpoints != prev.endpoints)
        {
            lines.push(count_line(view));
        }

        if view.editing != prev.editing {
            match &view.editing {
                Some(id) => lines.push(format!(
                    "editing {id} (use `set {id} <field> <value>`, `cancel` to leave)"
                )),
                None => lines.push("edit mode off".to_string()),
            }
        }

        if let Some(preview) = &view.preview {
            let changed = prev.preview.as_ref().map(|p| (&p.language, &p.text, p.failed))
                != Some((&preview.language, &preview.text, preview.failed));
            if changed {
                let flag = if preview.failed { " (unavailable)" } else { "" };
                lines.push(format!("--- preview: {}{flag} ---", preview.language));
                lines.extend(preview.text.lines().map(ToOwned::to_owned));
                lines.push("---".to_string());
            } else if preview.stale && !prev.preview.as_ref().is_some_and(|p| p.stale) {
                lines.push("preview is out of date; run `preview` again".to_string());
            }
        }

        if view.error != prev.error {
            if let Some(error) = &view.error {
                lines.push(format!("error: {error}"));
            }
        }
        if view.notice_seq != prev.notice_seq {
            if let Some(notice) = &view.notice {
                lines.push(notice.clone());
            }
        }
        if view.history != prev.history {
            lines.extend(history_lines(view));
        }
        if view.quota != prev.quota {
            if let Some(quota) = &view.quota {
                lines.push(quota_line(quota));
            }
        }

        self.previous = view.clone();
        lines
    }
}

fn job_id(view: &AppViewModel) -> Option<&str> {
    view.job.as_ref().map(|job| job.id.as_str())
}

fn job_status(view: &AppViewModel) -> Option<sdkforge_core::JobStatus> {
    view.job.as_ref().map(|job| job.status)
}

fn phase_line(view: &AppViewModel) -> String {
    let label = match view.phase {
        Phase::Idle => "idle",
        Phase::Submitting => "submitting",
        Phase::Processing => "processing",
        Phase::LoadingResults => "loading results",
        Phase::Review => "review",
        Phase::Failed => "failed",
    };
    match &view.job {
        Some(job) => format!("[{label}] {}", job_label(job)),
        None => format!("[{label}]"),
    }
}

fn job_label(job: &JobHandle) -> String {
    format!("{} ({}) {}", job.display_name, job.id, job.status)
}

fn count_line(view: &AppViewModel) -> String {
    let edited = if view.edited { ", edited" } else { "" };
    format!(
        "{} of {} endpoints{edited}",
        view.endpoint_count, view.original_count
    )
}

pub fn endpoint_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![count_line(view)];
    lines.extend(view.endpoints.iter().map(endpoint_line));
    lines
}

fn endpoint_line(endpoint: &Endpoint) -> String {
    let mut line = format!("  {:<7} {:<40} [{}]", endpoint.method, endpoint.path, endpoint.id);
    if !endpoint.summary.is_empty() {
        line.push_str("  ");
        line.push_str(&endpoint.summary);
    }
    line
}

fn suggestion_lines(view: &AppViewModel) -> Vec<String> {
    view.suggestions
        .iter()
        .map(|suggestion| {
            let marker = if suggestion.is_recommended { "*" } else { "-" };
            format!(
                "{marker} {} ({}): {}",
                suggestion.approach, suggestion.language, suggestion.reasoning
            )
        })
        .collect()
}

pub fn history_lines(view: &AppViewModel) -> Vec<String> {
    if view.history.is_empty() {
        return vec!["history is empty".to_string()];
    }
    view.history
        .iter()
        .map(|row| {
            format!(
                "  {:<12} {:<10} {} <{}>",
                row.job_id,
                row.status.label(),
                row.name,
                row.base_url
            )
        })
        .collect()
}

pub fn quota_line(quota: &RateLimit) -> String {
    format!(
        "quota: {}/{} used, {} left, resets in {}s",
        quota.used, quota.limit, quota.remaining, quota.reset_in_seconds
    )
}
