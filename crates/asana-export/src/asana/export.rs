//! Export command: walk project hierarchies and package the results
//!
//! One export document per project, bundled into an in-memory zip by
//! default or written into per-project directory trees with `--dest`.

use std::path::{Path, PathBuf};

use colored::Colorize;
use futures::{stream, StreamExt};

use asana_export_core::archive::ArchiveBuilder;
use asana_export_core::model::{AttachmentExport, ProjectExport, Resource, TaskExport};
use asana_export_core::paths;

use crate::prelude::{eprintln, println, *};

use super::client::{AsanaClient, FetchError, Listing};
use super::{create_asana_client, AsanaConfig};

/// Options for exporting projects
#[derive(Debug, clap::Args)]
#[command(after_help = "EXAMPLES:
  # Bundle two projects into exported_projects.zip:
  asana-export export 1201234567890123 1201234567890456

  # Bundle every project in the workspace:
  asana-export export --all --output backups/workspace.zip

  # Export into one directory per project, attachments included:
  asana-export export --all --dest ./exports")]
pub struct ExportOptions {
    /// Project gids to export
    #[arg(value_name = "PROJECT_GID")]
    pub projects: Vec<String>,

    /// Export every project in the workspace
    #[arg(long)]
    pub all: bool,

    /// Zip bundle destination
    #[arg(short, long, default_value = "exported_projects.zip")]
    pub output: PathBuf,

    /// Export into per-project directories (attachments included) instead
    /// of a zip bundle
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Maximum concurrent requests per fan-out stage
    #[arg(long, default_value = "4")]
    pub concurrency: usize,

    /// Workspace gid (overrides ASANA_WORKSPACE_GID)
    #[arg(long)]
    pub workspace: Option<String>,

    /// Remote API base URL (overrides ASANA_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,
}

pub async fn run(options: ExportOptions, global: crate::Global) -> Result<()> {
    let config = AsanaConfig::from_env()?
        .with_overrides(options.base_url.clone(), options.workspace.clone());
    let client = AsanaClient::new(create_asana_client(&config)?, &config);

    let listing = client.list_projects().await;
    if let Some(failure) = &listing.failure {
        eprintln!("warning: project listing is incomplete: {failure}");
    }
    let selected = select_projects(listing.records, &options.projects, options.all);
    if selected.is_empty() {
        return Err(eyre!("no projects selected for export"));
    }

    if global.verbose {
        println!("Exporting {} project(s)...", selected.len());
    }

    let exporter = Exporter::new(&client, options.concurrency);

    if let Some(dest) = &options.dest {
        export_to_directories(&exporter, &selected, dest).await
    } else {
        export_to_bundle(&exporter, &selected, &options.output).await
    }
}

/// Resolve the user's selection against the listed projects. Unknown gids
/// are ignored; `all` exports everything.
pub fn select_projects(
    projects: Vec<Resource>,
    selected_gids: &[String],
    all: bool,
) -> Vec<Resource> {
    if all {
        return projects;
    }
    projects
        .into_iter()
        .filter(|project| selected_gids.iter().any(|gid| *gid == project.gid))
        .collect()
}

async fn export_to_bundle(
    exporter: &Exporter<'_>,
    selected: &[Resource],
    output: &Path,
) -> Result<()> {
    let documents = exporter.export_projects(selected).await;

    let mut builder = ArchiveBuilder::new();
    for (project, document) in selected.iter().zip(&documents) {
        builder.add_project(display_name(project), &project.gid, document)?;
    }
    let bytes = builder.finish()?;
    tokio::fs::write(output, &bytes)
        .await
        .wrap_err_with(|| format!("Failed to write bundle to {}", output.display()))?;

    println!(
        "{} {} project(s) -> {}",
        "Exported".green().bold(),
        documents.len(),
        output.display()
    );
    Ok(())
}

async fn export_to_directories(
    exporter: &Exporter<'_>,
    selected: &[Resource],
    dest: &Path,
) -> Result<()> {
    tokio::fs::create_dir_all(dest)
        .await
        .wrap_err_with(|| format!("Failed to create {}", dest.display()))?;

    for project in selected {
        let folder = paths::project_folder(
            dest,
            display_name(project),
            &project.gid,
            paths::MAX_PATH_LENGTH,
        );
        tokio::fs::create_dir_all(&folder)
            .await
            .wrap_err_with(|| format!("Failed to create {}", folder.display()))?;

        let document = exporter.export_project(project, Some(&folder)).await;

        let document_path = folder.join("export.json");
        tokio::fs::write(&document_path, serde_json::to_vec_pretty(&document)?)
            .await
            .wrap_err_with(|| format!("Failed to write {}", document_path.display()))?;

        println!(
            "{} {} -> {}",
            "Exported".green().bold(),
            display_name(project),
            folder.display()
        );
    }
    Ok(())
}

/// Display name with the fallback used when a record carries none.
fn display_name(project: &Resource) -> &str {
    if project.name.is_empty() {
        "project"
    } else {
        &project.name
    }
}

/// Walks one project's hierarchy and assembles its export document.
///
/// Every fetch failure degrades to the empty default at the smallest
/// enclosing unit and is logged; no single task or attachment aborts its
/// siblings or the project. Fan-out runs through ordered bounded pools
/// (`buffered`), so concurrency never reorders the document: tasks keep
/// task-list order, and each task's sub-resources keep their endpoints'
/// order.
pub struct Exporter<'a> {
    client: &'a AsanaClient,
    concurrency: usize,
    max_path_len: usize,
}

impl<'a> Exporter<'a> {
    pub fn new(client: &'a AsanaClient, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
            max_path_len: paths::MAX_PATH_LENGTH,
        }
    }

    /// Export the selected projects without downloading attachment
    /// payloads, in selection order.
    pub async fn export_projects(&self, projects: &[Resource]) -> Vec<ProjectExport> {
        stream::iter(projects)
            .map(|project| self.export_project(project, None))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Export one project. With `dest_root` set, attachment payloads are
    /// downloaded under `dest_root/attachments`; without it only metadata
    /// is collected.
    pub async fn export_project(
        &self,
        project: &Resource,
        dest_root: Option<&Path>,
    ) -> ProjectExport {
        let detail = record_or_default(
            "project",
            &project.gid,
            self.client.get_project(&project.gid).await,
        );

        let tasks = self.client.list_project_tasks(&project.gid).await;
        let tasks: Vec<TaskExport> = stream::iter(tasks.records)
            .map(|task| self.export_task(task, dest_root))
            .buffered(self.concurrency)
            .collect()
            .await;

        ProjectExport {
            project: detail,
            tasks,
        }
    }

    async fn export_task(&self, task: Resource, dest_root: Option<&Path>) -> TaskExport {
        let gid = task.gid;
        let (detail, subtasks, stories, attachments) = tokio::join!(
            self.client.get_task(&gid),
            self.client.list_subtasks(&gid),
            self.client.list_stories(&gid),
            self.client.list_attachments(&gid),
        );

        let attachments = self.export_attachments(&gid, attachments, dest_root).await;

        TaskExport {
            task: record_or_default("task", &gid, detail),
            subtasks: subtasks.records,
            stories: stories.records,
            attachments,
        }
    }

    async fn export_attachments(
        &self,
        task_gid: &str,
        listing: Listing,
        dest_root: Option<&Path>,
    ) -> Vec<AttachmentExport> {
        if listing.records.is_empty() {
            return Vec::new();
        }

        let attachments_dir = match dest_root {
            Some(root) => self.prepare_attachments_dir(root, task_gid).await,
            None => None,
        };

        stream::iter(listing.records)
            .map(|attachment| {
                self.export_attachment(task_gid, attachment, dest_root, attachments_dir.as_deref())
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn export_attachment(
        &self,
        task_gid: &str,
        listed: Resource,
        dest_root: Option<&Path>,
        attachments_dir: Option<&Path>,
    ) -> AttachmentExport {
        let detail = record_or_default(
            "attachment",
            &listed.gid,
            self.client.get_attachment(&listed.gid).await,
        );

        let downloaded_path = match (dest_root, attachments_dir) {
            (Some(root), Some(dir)) => match self.download(task_gid, &detail, dir).await {
                Ok(dest) => Some(relative_to(&dest, root)),
                Err(failure) => {
                    log::warn!("skipping payload of attachment {}: {failure}", listed.gid);
                    None
                }
            },
            _ => None,
        };

        AttachmentExport {
            attachment: detail,
            downloaded_path,
        }
    }

    async fn download(
        &self,
        task_gid: &str,
        detail: &Resource,
        dir: &Path,
    ) -> Result<PathBuf, FetchError> {
        let url = detail
            .str_field("download_url")
            .ok_or_else(|| FetchError::MissingDownloadUrl {
                gid: detail.gid.clone(),
            })?;

        let original_name = if detail.name.is_empty() {
            format!("attachment_{}", detail.gid)
        } else {
            detail.name.clone()
        };
        let dest = paths::attachment_path(dir, task_gid, &original_name, self.max_path_len);

        self.client.download_attachment(url, &dest).await?;
        Ok(dest)
    }

    /// Create `root/attachments` idempotently; concurrent creations for
    /// sibling tasks land on the same directory.
    async fn prepare_attachments_dir(&self, root: &Path, task_gid: &str) -> Option<PathBuf> {
        let dir = paths::bound_path(&root.join("attachments"), self.max_path_len);
        match tokio::fs::create_dir_all(&dir).await {
            Ok(()) => Some(dir),
            Err(failure) => {
                log::warn!(
                    "creating {} failed, keeping metadata only for task {task_gid}: {failure}",
                    dir.display()
                );
                None
            }
        }
    }
}

/// Substitute the degraded default for a failed single-record fetch.
fn record_or_default(what: &str, gid: &str, result: Result<Resource, FetchError>) -> Resource {
    match result {
        Ok(record) => record,
        Err(failure) => {
            log::warn!("{what} {gid} unavailable: {failure}");
            Resource::default()
        }
    }
}

/// Path recorded in the document: relative to the export root when the
/// bounded destination still sits under it, the full path otherwise (the
/// hard-truncation fallback can move a destination out of the root).
fn relative_to(dest: &Path, root: &Path) -> String {
    dest.strip_prefix(root)
        .unwrap_or(dest)
        .to_string_lossy()
        .into_owned()
}
