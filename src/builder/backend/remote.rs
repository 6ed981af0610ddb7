//! Closure Compiler Service backend.
//!
//! Sends the whole source in one URL-encoded POST and reads the JSON reply.
//! Only the compilation level and externs can be expressed as request
//! parameters; other directives are skipped.

use serde::Deserialize;
use url::Url;

use crate::builder::directives::{Directive, OptimizationLevel};
use crate::builder::workspace::TempWorkspace;
use crate::core::error::{MinifyError, Result};

use super::{BackendKind, CompilationBackend};

/// Posts source to a compilation web service.
#[derive(Debug, Clone)]
pub struct RemoteServiceBackend {
    endpoint: Url,
}

impl RemoteServiceBackend {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            MinifyError::invalid(format!("invalid service endpoint `{}`: {}", endpoint, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(MinifyError::invalid(format!(
                "service endpoint must be http or https: {}",
                endpoint
            )));
        }
        Ok(RemoteServiceBackend { endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Request parameters, in the order they are sent.
    ///
    /// Extern files are read here and sent by content.
    pub fn request_form(
        &self,
        source: &str,
        directives: &[Directive],
    ) -> Result<Vec<(&'static str, String)>> {
        let mut form = vec![
            ("output_format", "json".to_string()),
            ("output_info", "compiled_code".to_string()),
            ("output_info", "warnings".to_string()),
            ("output_info", "errors".to_string()),
            ("output_info", "statistics".to_string()),
            ("warning_level", "default".to_string()),
        ];

        let mut level = OptimizationLevel::Simple;
        let mut externs = Vec::new();
        for directive in directives {
            match directive {
                Directive::CompilationLevel(l) => level = *l,
                Directive::Externs(path) => {
                    let code = std::fs::read_to_string(path)
                        .map_err(|e| MinifyError::io(path, e))?;
                    externs.push(code);
                }
                other => {
                    tracing::debug!("compilation service ignores `{}`", other.name());
                }
            }
        }

        form.push(("compilation_level", level.as_str().to_string()));
        if level == OptimizationLevel::Advanced {
            form.extend(externs.into_iter().map(|code| ("js_externs", code)));
        }
        form.push(("js_code", source.to_string()));

        Ok(form)
    }
}

impl CompilationBackend for RemoteServiceBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::RemoteService
    }

    fn compile(
        &self,
        source: &str,
        directives: &[Directive],
        _workspace: Option<&TempWorkspace>,
    ) -> Result<String> {
        let form = self.request_form(source, directives)?;

        tracing::debug!("POST {} ({} bytes of source)", self.endpoint, source.len());

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("minify/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MinifyError::Network(e.to_string()))?;

        let response = client
            .post(self.endpoint.clone())
            .form(&form)
            .send()
            .map_err(|e| MinifyError::Network(format!("{}: {}", self.endpoint, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| MinifyError::Network(format!("failed to read response body: {}", e)))?;

        interpret_response(status, &body)
    }
}

/// JSON reply from the compilation service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub compiled_code: Option<String>,
    #[serde(default)]
    pub errors: Vec<ServiceMessage>,
    #[serde(default)]
    pub warnings: Vec<ServiceMessage>,
    #[serde(default)]
    pub server_errors: Vec<ServerError>,
    pub statistics: Option<Statistics>,
}

/// A compiler error or warning reported by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceMessage {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub file: Option<String>,
    pub lineno: Option<i64>,
    pub charno: Option<i64>,
    /// Set on errors
    pub error: Option<String>,
    /// Set on warnings
    pub warning: Option<String>,
    /// Offending source line
    pub line: Option<String>,
}

impl ServiceMessage {
    fn render(&self) -> String {
        let text = self
            .error
            .as_deref()
            .or(self.warning.as_deref())
            .unwrap_or("unknown problem");
        let mut rendered = format!(
            "{}:{}:{}: {}",
            self.file.as_deref().unwrap_or("Input_0"),
            self.lineno.unwrap_or(0),
            self.charno.unwrap_or(0),
            text
        );
        if let Some(ref kind) = self.kind {
            rendered.push_str(&format!(" [{}]", kind));
        }
        if let Some(ref line) = self.line {
            rendered.push_str(&format!("\n    {}", line));
        }
        rendered
    }
}

/// A request-level failure reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerError {
    pub code: Option<i64>,
    pub error: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub original_size: Option<u64>,
    pub compressed_size: Option<u64>,
    pub compile_time: Option<u64>,
}

/// Turn a service reply into compiled code or a failure.
///
/// Warnings are logged and never fail the build.
pub fn interpret_response(status: u16, body: &str) -> Result<String> {
    if status != 200 {
        return Err(MinifyError::Network(format!(
            "compilation service answered HTTP {}",
            status
        )));
    }

    let response: ServiceResponse = serde_json::from_str(body).map_err(|e| {
        MinifyError::backend(
            BackendKind::RemoteService,
            format!("unreadable service response: {}", e),
        )
    })?;

    for warning in &response.warnings {
        tracing::warn!("{}", warning.render());
    }

    if !response.server_errors.is_empty() || !response.errors.is_empty() {
        let diagnostic = response
            .server_errors
            .iter()
            .map(|e| match e.code {
                Some(code) => format!("server error {}: {}", code, e.error),
                None => format!("server error: {}", e.error),
            })
            .chain(response.errors.iter().map(ServiceMessage::render))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(MinifyError::backend(BackendKind::RemoteService, diagnostic));
    }

    if let Some(ref stats) = response.statistics {
        tracing::debug!(
            "service compiled {} -> {} bytes",
            stats.original_size.unwrap_or(0),
            stats.compressed_size.unwrap_or(0)
        );
    }

    response.compiled_code.ok_or_else(|| {
        MinifyError::backend(
            BackendKind::RemoteService,
            "service response has no compiledCode",
        )
    })
}
