use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AutofillError;

pub const DEFAULT_SERVER_SCRIPT: &str = "node/form-bridge/browser_server.js";

/// Request sent to the bridge over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Navigate {
        cmd: &'static str,
        url: String,
    },
    Snapshot {
        cmd: &'static str,
    },
    /// Set the value of the element at `path`, then dispatch bubbling
    /// `input` and `change` events on it.
    Fill {
        cmd: &'static str,
        path: String,
        value: String,
    },
    /// Clear the border of every form, then smooth-scroll `path` (if any)
    /// to the center of the viewport.
    Highlight {
        cmd: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    Quit {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn navigate(url: &str) -> Self {
        BrowserRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn snapshot() -> Self {
        BrowserRequest::Snapshot { cmd: "snapshot" }
    }

    pub fn fill(path: &str, value: &str) -> Self {
        BrowserRequest::Fill {
            cmd: "fill",
            path: path.to_string(),
            value: value.to_string(),
        }
    }

    pub fn highlight(path: Option<&str>) -> Self {
        BrowserRequest::Highlight {
            cmd: "highlight",
            path: path.map(str::to_string),
        }
    }

    pub fn quit() -> Self {
        BrowserRequest::Quit { cmd: "quit" }
    }
}

/// Response received from the bridge over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
}

/// Page markup as captured by the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub html: String,
    pub url: String,
    pub title: String,
}

/// A persistent browser session backed by a Node.js bridge process that keeps
/// one Chromium tab open. Commands are NDJSON over stdin, responses NDJSON
/// over stdout.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    current_url: Option<String>,
}

impl BrowserSession {
    /// Spawn the bridge and wait for its ready signal.
    pub fn launch(script: &str) -> Result<Self, AutofillError> {
        let mut child = Command::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| AutofillError::SubprocessSpawn {
                script: script.into(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            AutofillError::SessionIO(format!("Failed to capture stdin of {}", script))
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            AutofillError::SessionIO(format!("Failed to capture stdout of {}", script))
        })?;

        let mut reader = BufReader::new(stdout);

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| AutofillError::SessionIO(format!("Failed to read ready signal: {}", e)))?;

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| AutofillError::JsonParse {
                context: "bridge ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(AutofillError::SessionProtocol {
                command: "launch".into(),
                error: "Did not receive ready signal from bridge".into(),
            });
        }

        Ok(BrowserSession {
            child,
            stdin,
            reader,
            current_url: None,
        })
    }

    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, AutofillError> {
        let json = serde_json::to_string(request).map_err(|e| AutofillError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;
        debug!(request = %json, "bridge request");

        writeln!(self.stdin, "{}", json)
            .map_err(|e| AutofillError::SessionIO(format!("Failed to write to bridge: {}", e)))?;

        self.stdin
            .flush()
            .map_err(|e| AutofillError::SessionIO(format!("Failed to flush bridge stdin: {}", e)))?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| AutofillError::SessionIO(format!("Failed to read from bridge: {}", e)))?;

        if line.trim().is_empty() {
            return Err(AutofillError::SessionIO(
                "Empty response from bridge (process may have died)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| AutofillError::JsonParse {
            context: "bridge response".into(),
            source: e,
        })
    }

    fn send_ok(
        &mut self,
        request: &BrowserRequest,
        command_name: &str,
    ) -> Result<BrowserResponse, AutofillError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(AutofillError::SessionProtocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        Ok(response)
    }

    pub fn navigate(&mut self, url: &str) -> Result<(), AutofillError> {
        self.send_ok(&BrowserRequest::navigate(url), "navigate")?;
        self.current_url = Some(url.to_string());
        Ok(())
    }

    /// Capture the current page. Fails with `NoActiveContext` when nothing
    /// has been loaded yet.
    pub fn snapshot(&mut self) -> Result<PageSnapshot, AutofillError> {
        if self.current_url.is_none() {
            return Err(AutofillError::NoActiveContext(
                "no page has been opened in this session".into(),
            ));
        }
        let response = self.send_ok(&BrowserRequest::snapshot(), "snapshot")?;
        let html = response.html.ok_or_else(|| AutofillError::SessionProtocol {
            command: "snapshot".into(),
            error: "No html in snapshot response".into(),
        })?;
        let url = response
            .url
            .or_else(|| self.current_url.clone())
            .unwrap_or_default();
        self.current_url = Some(url.clone());
        Ok(PageSnapshot {
            html,
            url,
            title: response.title.unwrap_or_default(),
        })
    }

    pub fn fill(&mut self, path: &str, value: &str) -> Result<(), AutofillError> {
        self.send_ok(&BrowserRequest::fill(path, value), "fill")?;
        Ok(())
    }

    pub fn highlight(&mut self, path: Option<&str>) -> Result<(), AutofillError> {
        self.send_ok(&BrowserRequest::highlight(path), "highlight")?;
        Ok(())
    }

    pub fn quit(&mut self) -> Result<(), AutofillError> {
        // Best-effort: the process may already be gone
        if let Err(e) = self.send(&BrowserRequest::quit()) {
            warn!(error = %e, "bridge quit request failed");
        }
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
