//! Workspace path map.
//!
//! Every file lempkit reads or writes lives at a fixed location relative to
//! the workspace root; this module is the single place those relative paths
//! are spelled out.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LempResult;

/// The directory lempkit operates in and the fixed paths inside it.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Credentials record (`lempkit.env`).
    pub fn credentials_file(&self) -> PathBuf {
        self.root.join("lempkit.env")
    }

    /// Optional settings file (`lempkit.toml`).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("lempkit.toml")
    }

    /// Compose manifest (`docker-compose.yml`).
    pub fn manifest_file(&self) -> PathBuf {
        self.root.join("docker-compose.yml")
    }

    /// Runtime image build recipe (`php/Dockerfile`).
    pub fn dockerfile(&self) -> PathBuf {
        self.root.join("php").join("Dockerfile")
    }

    /// Reverse proxy configuration (`nginx/conf.d/default.conf`).
    pub fn proxy_conf(&self) -> PathBuf {
        self.root.join("nginx").join("conf.d").join("default.conf")
    }

    /// Application directory, bind-mounted into nginx and php as `/var/www`.
    pub fn app_dir(&self) -> PathBuf {
        self.root.join("www")
    }

    /// The scaffold's example settings file.
    pub fn settings_example(&self) -> PathBuf {
        self.app_dir().join(".env.example")
    }

    /// The application's active settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.app_dir().join(".env")
    }

    /// Blade views directory of the scaffolded application.
    pub fn views_dir(&self) -> PathBuf {
        self.app_dir().join("resources").join("views")
    }

    /// The landing page template overwritten by the customizer.
    pub fn landing_page(&self) -> PathBuf {
        self.views_dir().join("welcome.blade.php")
    }

    /// MariaDB data directory, bind-mounted as `/var/lib/mysql`.
    pub fn db_data_dir(&self) -> PathBuf {
        self.root.join("mysql")
    }

    /// Delete the application directory and everything in it (including
    /// `.git`), then recreate it empty. Destructive and irreversible.
    pub fn clear_app_dir(&self) -> LempResult<()> {
        let app = self.app_dir();
        if app.exists() {
            fs::remove_dir_all(&app)?;
        }
        fs::create_dir_all(&app)?;
        Ok(())
    }
}
