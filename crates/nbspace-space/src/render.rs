//! Dockerfile and compose descriptor rendering.
//!
//! Each template has a parameter type that lists exactly the placeholders the
//! template uses; the tests at the bottom hold the two in sync.

use std::path::{Path, PathBuf};

use nbspace_core::NotebookBasic;

use crate::credential::TokenError;
use crate::error::{Result, SpaceError};
use crate::probe::HostIdentity;
use crate::template::{Template, TemplateError};

pub const DOCKERFILE_WITH_REQUIREMENTS: Template = Template::new(
    "dockerfile_with_requirements",
    include_str!("../templates/dockerfile_with_requirements.tmpl"),
);
pub const DOCKERFILE_WITHOUT_REQUIREMENTS: Template = Template::new(
    "dockerfile_without_requirements",
    include_str!("../templates/dockerfile_without_requirements.tmpl"),
);
pub const COMPOSE: Template = Template::new("compose", include_str!("../templates/compose.tmpl"));
pub const COMPOSE_VIEW: Template =
    Template::new("compose_view", include_str!("../templates/compose_view.tmpl"));

/// Orchestration descriptor file name inside the build directory.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// `user` value for editable environments: the image starts as root and the
/// entrypoint drops to `NB_UID`/`NB_GID`.
pub const USER_ROOT: &str = "USER root";
/// `user` value for view-only environments: keep the image's default user.
pub const USER_LEAST_PRIVILEGE: &str = "#user with least privilege";

/// A template together with the values it is rendered with.
pub trait TemplateParams {
    fn template(&self) -> Template;

    fn values(&self) -> Vec<(&'static str, String)>;

    fn render(&self) -> std::result::Result<String, TemplateError> {
        self.template().substitute(&self.values())
    }
}

/// `{fqn}{request_id}.dfile`
pub fn dockerfile_name(notebook: &NotebookBasic, request_id: &str) -> String {
    format!("{}{}.dfile", notebook.fqn(), request_id)
}

/// `{fqn}-r{request_id}`, lower-cased. Used as service, container and image name.
pub fn project_name(notebook: &NotebookBasic, request_id: &str) -> String {
    format!("{}-r{}", notebook.fqn(), request_id).to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockerfileParams {
    pub has_requirements: bool,
    pub view_only: bool,
}

impl TemplateParams for DockerfileParams {
    fn template(&self) -> Template {
        if self.has_requirements {
            DOCKERFILE_WITH_REQUIREMENTS
        } else {
            DOCKERFILE_WITHOUT_REQUIREMENTS
        }
    }

    fn values(&self) -> Vec<(&'static str, String)> {
        let user = if self.view_only {
            USER_LEAST_PRIVILEGE
        } else {
            USER_ROOT
        };
        vec![("user", user.to_string())]
    }
}

/// How the container maps onto the host user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeMode {
    /// Read-only mount, no host identity mapping.
    ViewOnly,
    /// Writable mount owned by the invoking host user.
    Owner(HostIdentity),
}

/// Values for the compose descriptor. Built with [`ComposeParams::new`], which
/// rejects values that cannot sit inside a double-quoted YAML scalar.
#[derive(Clone, PartialEq, Eq)]
pub struct ComposeParams {
    project_name: String,
    project_defn: String,
    project_token: String,
    project_path: String,
    port: u16,
    mode: ComposeMode,
}

impl std::fmt::Debug for ComposeParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposeParams")
            .field("project_name", &self.project_name)
            .field("project_defn", &self.project_defn)
            .field("project_token", &"<redacted>")
            .field("project_path", &self.project_path)
            .field("port", &self.port)
            .field("mode", &self.mode)
            .finish()
    }
}

fn is_quotable(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(|c| c == '"' || c == '\\' || c.is_control())
}

fn check_scalar(field: &'static str, value: &str) -> Result<()> {
    if is_quotable(value) {
        Ok(())
    } else {
        Err(SpaceError::UnsafeValue { field })
    }
}

/// docker-compose interpolates `$VAR` in every value; `$$` is its literal `$`.
fn compose_literal(value: &str) -> String {
    value.replace('$', "$$")
}

impl ComposeParams {
    pub fn new(
        project_name: String,
        project_defn: String,
        project_token: String,
        project_path: &Path,
        port: u16,
        mode: ComposeMode,
    ) -> Result<Self> {
        let project_path = project_path
            .to_str()
            .ok_or(SpaceError::UnsafeValue {
                field: "project_path",
            })?
            .to_string();
        if !is_quotable(&project_token) {
            return Err(TokenError::Unusable.into());
        }
        check_scalar("project_name", &project_name)?;
        check_scalar("project_defn", &project_defn)?;
        check_scalar("project_path", &project_path)?;
        Ok(Self {
            project_name,
            project_defn,
            project_token,
            project_path,
            port,
            mode,
        })
    }
}

impl TemplateParams for ComposeParams {
    fn template(&self) -> Template {
        match self.mode {
            ComposeMode::ViewOnly => COMPOSE_VIEW,
            ComposeMode::Owner(_) => COMPOSE,
        }
    }

    fn values(&self) -> Vec<(&'static str, String)> {
        let mut values = vec![
            ("project_name", compose_literal(&self.project_name)),
            ("project_defn", compose_literal(&self.project_defn)),
            ("project_token", compose_literal(&self.project_token)),
            ("project_path", compose_literal(&self.project_path)),
            ("port", self.port.to_string()),
        ];
        if let ComposeMode::Owner(identity) = self.mode {
            values.push(("nb_gid", identity.gid.to_string()));
            values.push(("nb_uid", identity.uid.to_string()));
        }
        values
    }
}

/// Render and write the dockerfile into `build_dir`. Returns its file name.
pub fn write_dockerfile(
    build_dir: &Path,
    notebook: &NotebookBasic,
    request_id: &str,
    params: DockerfileParams,
) -> Result<String> {
    let name = dockerfile_name(notebook, request_id);
    let content = params.render()?;
    crate::fs::write_text(build_dir, &name, &content)?;
    Ok(name)
}

/// Render `docker-compose.yml` into `build_dir`.
///
/// The rendered text is parsed as YAML before it is written, so a template
/// that renders to something docker-compose cannot read never reaches disk.
pub fn write_compose(build_dir: &Path, params: &ComposeParams) -> Result<PathBuf> {
    let content = params.render()?;
    serde_yaml::from_str::<serde_yaml::Value>(&content).map_err(|e| {
        TemplateError::InvalidOutput {
            template: params.template().name(),
            reason: e.to_string(),
        }
    })?;
    crate::fs::write_text(build_dir, COMPOSE_FILE, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn identity() -> HostIdentity {
        HostIdentity { uid: 1000, gid: 100 }
    }

    fn compose_params(mode: ComposeMode) -> ComposeParams {
        ComposeParams::new(
            "demo-1.0-rr7".into(),
            "demo-1.0r7.dfile".into(),
            "s3cret".into(),
            Path::new("/srv/notebooks/r7/demo/1.0"),
            43123,
            mode,
        )
        .unwrap()
    }

    fn keys(params: &dyn TemplateParams) -> BTreeSet<&'static str> {
        params.values().into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_dockerfile_placeholders_match_params() {
        for has_requirements in [true, false] {
            for view_only in [true, false] {
                let params = DockerfileParams {
                    has_requirements,
                    view_only,
                };
                assert_eq!(params.template().placeholders().unwrap(), keys(&params));
            }
        }
    }

    #[test]
    fn test_compose_placeholders_match_params() {
        for mode in [ComposeMode::ViewOnly, ComposeMode::Owner(identity())] {
            let params = compose_params(mode);
            assert_eq!(params.template().placeholders().unwrap(), keys(&params));
        }
    }

    #[test]
    fn test_dockerfile_user_line() {
        let editable = DockerfileParams {
            has_requirements: false,
            view_only: false,
        }
        .render()
        .unwrap();
        assert!(editable.contains("USER root"));

        let view = DockerfileParams {
            has_requirements: false,
            view_only: true,
        }
        .render()
        .unwrap();
        assert!(!view.contains("USER root"));
        assert!(view.contains(USER_LEAST_PRIVILEGE));
    }

    #[test]
    fn test_dockerfile_requirements_step_only_with_manifest() {
        let with = DockerfileParams {
            has_requirements: true,
            view_only: false,
        }
        .render()
        .unwrap();
        assert!(with.contains("requirements.txt"));
        let without = DockerfileParams {
            has_requirements: false,
            view_only: false,
        }
        .render()
        .unwrap();
        assert!(!without.contains("requirements.txt"));
    }

    #[test]
    fn test_names() {
        let nb = NotebookBasic::new("Demo", "1.0");
        assert_eq!(dockerfile_name(&nb, "r7"), "Demo-1.0r7.dfile");
        assert_eq!(project_name(&nb, "R7"), "demo-1.0-rr7");
    }

    #[test]
    fn test_compose_owner_maps_identity() {
        let out = compose_params(ComposeMode::Owner(identity())).render().unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
        let svc = &doc["services"]["demo-1.0-rr7"];
        assert_eq!(svc["container_name"].as_str(), Some("demo-1.0-rr7"));
        assert_eq!(svc["build"]["dockerfile"].as_str(), Some("demo-1.0r7.dfile"));
        assert_eq!(svc["environment"]["JUPYTER_TOKEN"].as_str(), Some("s3cret"));
        assert_eq!(svc["environment"]["NB_UID"].as_str(), Some("1000"));
        assert_eq!(svc["environment"]["NB_GID"].as_str(), Some("100"));
        assert_eq!(svc["ports"][0].as_str(), Some("43123:8888"));
        assert_eq!(
            svc["volumes"][0].as_str(),
            Some("/srv/notebooks/r7/demo/1.0:/home/jovyan/work")
        );
    }

    #[test]
    fn test_compose_view_has_no_identity() {
        let out = compose_params(ComposeMode::ViewOnly).render().unwrap();
        assert!(!out.contains("NB_UID"));
        assert!(!out.contains("NB_GID"));
        let doc: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
        let svc = &doc["services"]["demo-1.0-rr7"];
        assert_eq!(
            svc["volumes"][0].as_str(),
            Some("/srv/notebooks/r7/demo/1.0:/home/jovyan/work:ro")
        );
    }

    #[test]
    fn test_compose_rejects_unusable_token() {
        for token in ["a\"b", "a\nb", "a\\b", ""] {
            let err = ComposeParams::new(
                "p".into(),
                "d".into(),
                token.into(),
                Path::new("/x"),
                1,
                ComposeMode::ViewOnly,
            )
            .unwrap_err();
            assert!(
                matches!(err, SpaceError::Token(TokenError::Unusable)),
                "{token:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_compose_rejects_unquotable_path() {
        let err = ComposeParams::new(
            "p".into(),
            "d".into(),
            "t".into(),
            Path::new("/srv/\"quoted\""),
            1,
            ComposeMode::ViewOnly,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SpaceError::UnsafeValue {
                field: "project_path"
            }
        ));
    }

    #[test]
    fn test_compose_escapes_dollar() {
        let params = ComposeParams::new(
            "demo-1.0-rr7".into(),
            "demo-1.0r7.dfile".into(),
            "abc$HOME".into(),
            Path::new("/srv/$USER/nb"),
            43123,
            ComposeMode::ViewOnly,
        )
        .unwrap();
        let out = params.render().unwrap();
        assert!(out.contains(r#"JUPYTER_TOKEN: "abc$$HOME""#), "{out}");
        assert!(!out.contains("abc$HOME\""));
        let doc: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(
            doc["services"]["demo-1.0-rr7"]["volumes"][0].as_str(),
            Some("/srv/$$USER/nb:/home/jovyan/work:ro")
        );
    }

    #[test]
    fn test_compose_params_debug_hides_token() {
        let dbg = format!("{:?}", compose_params(ComposeMode::ViewOnly));
        assert!(!dbg.contains("s3cret"));
    }

    #[test]
    fn test_write_files() {
        let tmp = tempfile::tempdir().unwrap();
        let nb = NotebookBasic::new("demo", "1.0");
        let name = write_dockerfile(
            tmp.path(),
            &nb,
            "r7",
            DockerfileParams {
                has_requirements: true,
                view_only: false,
            },
        )
        .unwrap();
        assert_eq!(name, "demo-1.0r7.dfile");
        assert!(tmp.path().join(&name).is_file());

        let path = write_compose(tmp.path(), &compose_params(ComposeMode::ViewOnly)).unwrap();
        assert_eq!(path, tmp.path().join(COMPOSE_FILE));
    }
}
