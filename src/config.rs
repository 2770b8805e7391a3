//! Loads the project configuration from `config.yaml`.

use crate::url::BasePath;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The name of the project file.
pub const PROJECT_FILE_NAME: &str = "config.yaml";

/// The name of the default output directory, relative to the project
/// directory.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "docs";

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Website {
    /// The public URL of the site, used for absolute links in the feed and in
    /// `og:image` tags, and for the `CNAME` file.
    pub url: String,

    /// The display name of the site.
    pub name: String,

    /// The mount prefix for production builds.
    #[serde(default, rename = "basePath")]
    pub base_path: String,

    /// The mount prefix for `--dev` builds.
    #[serde(default, rename = "devPath")]
    pub dev_path: Option<String>,
}

/// A navigation entry. `path` is the source path of the target document.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MenuEntry {
    pub title: String,
    pub path: String,
}

/// Settings for the newsletter subscription form.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Quacker {
    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub site_owner: String,

    /// The host which receives subscriptions. The form is only rendered when
    /// this is set.
    #[serde(default)]
    pub target: String,
}

#[derive(Deserialize)]
struct Project {
    website: Website,

    #[serde(default)]
    menu: Vec<MenuEntry>,

    #[serde(default)]
    quacker: Option<Quacker>,

    #[serde(default)]
    template: Option<PathBuf>,
}

/// The loaded project configuration. Read-only for the duration of a build.
#[derive(Clone, Debug)]
pub struct Config {
    /// The directory holding the project file. It is also the content root.
    pub project_directory: PathBuf,
    pub website: Website,
    pub menu: Vec<MenuEntry>,
    pub quacker: Option<Quacker>,

    /// The page template file, if the project overrides the built-in one.
    pub template: Option<PathBuf>,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a project file and
    /// loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Resolving project directory `{}`", dir.display()))?;
        let mut candidate = Some(dir.as_path());
        while let Some(dir) = candidate {
            let path = dir.join(PROJECT_FILE_NAME);
            if path.is_file() {
                return Config::from_project_file(&path)
                    .with_context(|| format!("Loading configuration `{}`", path.display()));
            }
            candidate = dir.parent();
        }
        Err(anyhow!(
            "Could not find `{}` in `{}` or any parent directory",
            PROJECT_FILE_NAME,
            dir.display()
        ))
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_directory) => Config::parse(project_directory, &contents),
        }
    }

    /// Parses the contents of a project file which lives in
    /// `project_directory`.
    pub fn parse(project_directory: &Path, input: &str) -> Result<Config> {
        let project: Project = serde_yaml::from_str(input)?;
        Ok(Config {
            project_directory: project_directory.to_owned(),
            website: project.website,
            menu: project.menu,
            quacker: project.quacker.filter(|q| !q.target.trim().is_empty()),
            template: project
                .template
                .map(|template| project_directory.join(template)),
        })
    }

    /// The mount prefix for the build. Development builds use `devPath`,
    /// falling back to `basePath` when it isn't set.
    pub fn base_path(&self, dev: bool) -> BasePath {
        match (&self.website.dev_path, dev) {
            (Some(dev_path), true) => BasePath::new(dev_path),
            _ => BasePath::new(&self.website.base_path),
        }
    }

    /// The directory whose markdown files make up the site.
    pub fn content_directory(&self) -> &Path {
        &self.project_directory
    }

    pub fn default_output_directory(&self) -> PathBuf {
        self.project_directory.join(DEFAULT_OUTPUT_DIRECTORY)
    }
}
