//! Typed Docker Compose manifest.
//!
//! The manifest is modeled as structs and serialized with `serde_yaml_ng`
//! instead of being string-templated, so regeneration is deterministic:
//! identical credentials always produce byte-identical YAML, and the MariaDB
//! environment can never drift from the credentials record.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::credentials::Credentials;
use crate::error::LempResult;

pub const PROJECT_NAME: &str = "lemp";
pub const NGINX_IMAGE: &str = "nginx:1.27-alpine";
pub const MARIADB_IMAGE: &str = "mariadb:10.11";

/// Root of `docker-compose.yml`.
#[derive(Debug, Clone, Serialize)]
pub struct ComposeManifest {
    pub name: String,
    pub services: BTreeMap<String, Service>,
    pub networks: BTreeMap<String, Network>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Service {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    pub container_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    pub networks: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Network {
    pub driver: String,
}

impl ComposeManifest {
    /// Build the three-service manifest from the current credentials and
    /// the published HTTP port.
    pub fn build(credentials: &Credentials, http_port: u16) -> Self {
        let mut services = BTreeMap::new();

        services.insert(
            "nginx".to_string(),
            Service {
                image: Some(NGINX_IMAGE.to_string()),
                container_name: "lemp-nginx".to_string(),
                ports: vec![format!("{http_port}:80")],
                volumes: vec![
                    "./www:/var/www".to_string(),
                    "./nginx/conf.d:/etc/nginx/conf.d".to_string(),
                ],
                depends_on: vec!["php".to_string()],
                networks: vec![PROJECT_NAME.to_string()],
                ..Service::default()
            },
        );

        services.insert(
            "php".to_string(),
            Service {
                build: Some("./php".to_string()),
                container_name: "lemp-php".to_string(),
                volumes: vec!["./www:/var/www".to_string()],
                networks: vec![PROJECT_NAME.to_string()],
                ..Service::default()
            },
        );

        let mut environment = BTreeMap::new();
        environment.insert(
            "MYSQL_ROOT_PASSWORD".to_string(),
            credentials.root_password.clone(),
        );
        environment.insert("MYSQL_DATABASE".to_string(), credentials.database.clone());
        environment.insert("MYSQL_USER".to_string(), credentials.username.clone());
        environment.insert("MYSQL_PASSWORD".to_string(), credentials.password.clone());

        services.insert(
            "mariadb".to_string(),
            Service {
                image: Some(MARIADB_IMAGE.to_string()),
                container_name: "lemp-mariadb".to_string(),
                volumes: vec!["./mysql:/var/lib/mysql".to_string()],
                environment,
                networks: vec![PROJECT_NAME.to_string()],
                ..Service::default()
            },
        );

        let mut networks = BTreeMap::new();
        networks.insert(
            PROJECT_NAME.to_string(),
            Network {
                driver: "bridge".to_string(),
            },
        );

        ComposeManifest {
            name: PROJECT_NAME.to_string(),
            services,
            networks,
        }
    }

    /// Serialize to the YAML written to `docker-compose.yml`.
    pub fn to_yaml(&self) -> LempResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

/// Render the manifest for the given credentials.
pub fn render(credentials: &Credentials, http_port: u16) -> LempResult<String> {
    ComposeManifest::build(credentials, http_port).to_yaml()
}
