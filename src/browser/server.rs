use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

use crate::browser::driver::{AutomationDriver, ElementHandle, PageFactory, Rect, Selector};
use crate::error::DriverError;

/// Request sent to the browser server over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BrowserRequest<'a> {
    Navigate { url: &'a str },
    Resolve { selector: &'a Selector },
    Click { handle: &'a ElementHandle },
    Fill { handle: &'a ElementHandle, value: &'a str },
    ReadText { handle: &'a ElementHandle },
    ReadAttribute { handle: &'a ElementHandle, name: &'a str },
    IsVisible { handle: &'a ElementHandle },
    BoundingBox { handle: &'a ElementHandle },
    Quit,
}

impl BrowserRequest<'_> {
    fn name(&self) -> &'static str {
        match self {
            BrowserRequest::Navigate { .. } => "navigate",
            BrowserRequest::Resolve { .. } => "resolve",
            BrowserRequest::Click { .. } => "click",
            BrowserRequest::Fill { .. } => "fill",
            BrowserRequest::ReadText { .. } => "read_text",
            BrowserRequest::ReadAttribute { .. } => "read_attribute",
            BrowserRequest::IsVisible { .. } => "is_visible",
            BrowserRequest::BoundingBox { .. } => "bounding_box",
            BrowserRequest::Quit => "quit",
        }
    }
}

/// Response received from the browser server over stdout (one JSON line).
#[derive(Debug, Default, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub stale: Option<bool>,
    #[serde(default)]
    pub handles: Option<Vec<ElementHandle>>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub rect: Option<Rect>,
}

struct ServerIo {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
}

/// One browser page driven by a long-lived Node.js process.
///
/// Commands are NDJSON over stdin, responses are read from stdout. The mutex keeps
/// exactly one request in flight, so calls against the page are strictly sequential.
pub struct BrowserServer {
    io: Mutex<Option<ServerIo>>,
}

impl BrowserServer {
    /// Spawn the server script and wait for its ready line.
    pub async fn launch(node: &str, script: &Path) -> Result<Self, DriverError> {
        let mut child = Command::new(node)
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DriverError::Spawn {
                program: format!("{} {}", node, script.display()),
                source: e,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DriverError::Io("failed to capture stdin of browser server".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DriverError::Io("failed to capture stdout of browser server".into()))?;

        let mut reader = BufReader::new(stdout);
        let ready = read_response(&mut reader, "ready signal").await?;
        if !ready.ok || ready.ready != Some(true) {
            return Err(DriverError::Protocol {
                command: "launch".into(),
                error: "did not receive ready signal from browser server".into(),
            });
        }

        tracing::debug!(script = %script.display(), "browser server ready");

        Ok(Self {
            io: Mutex::new(Some(ServerIo {
                child,
                stdin,
                reader,
            })),
        })
    }

    async fn send(&self, request: &BrowserRequest<'_>) -> Result<BrowserResponse, DriverError> {
        let command = request.name();
        let json = serde_json::to_string(request).map_err(|e| DriverError::Json {
            context: format!("{} request", command),
            source: e,
        })?;

        let mut guard = self.io.lock().await;
        let io = guard.as_mut().ok_or(DriverError::Closed)?;

        io.stdin
            .write_all(format!("{}\n", json).as_bytes())
            .await
            .map_err(|e| DriverError::Io(format!("write '{}': {}", command, e)))?;
        io.stdin
            .flush()
            .await
            .map_err(|e| DriverError::Io(format!("flush '{}': {}", command, e)))?;

        let response = read_response(&mut io.reader, command).await?;
        if !response.ok {
            if response.stale == Some(true) {
                return Err(DriverError::StaleHandle(
                    response.error.unwrap_or_else(|| command.to_string()),
                ));
            }
            return Err(DriverError::Protocol {
                command: command.into(),
                error: response.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(response)
    }
}

async fn read_response(
    reader: &mut BufReader<ChildStdout>,
    context: &str,
) -> Result<BrowserResponse, DriverError> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .await
        .map_err(|e| DriverError::Io(format!("read {}: {}", context, e)))?;

    if line.trim().is_empty() {
        return Err(DriverError::Io(format!(
            "empty response to {} (process may have died)",
            context
        )));
    }

    serde_json::from_str(line.trim()).map_err(|e| DriverError::Json {
        context: format!("{} response", context),
        source: e,
    })
}

#[async_trait]
impl AutomationDriver for BrowserServer {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.send(&BrowserRequest::Navigate { url }).await?;
        Ok(())
    }

    async fn resolve(&self, selector: &Selector) -> Result<Vec<ElementHandle>, DriverError> {
        let response = self.send(&BrowserRequest::Resolve { selector }).await?;
        Ok(response.handles.unwrap_or_default())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.send(&BrowserRequest::Click { handle: element }).await?;
        Ok(())
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.send(&BrowserRequest::Fill {
            handle: element,
            value: text,
        })
        .await?;
        Ok(())
    }

    async fn read_text(&self, element: &ElementHandle) -> Result<Option<String>, DriverError> {
        let response = self.send(&BrowserRequest::ReadText { handle: element }).await?;
        Ok(response.text)
    }

    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let response = self
            .send(&BrowserRequest::ReadAttribute {
                handle: element,
                name,
            })
            .await?;
        Ok(response.value)
    }

    async fn is_visible(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        let response = self.send(&BrowserRequest::IsVisible { handle: element }).await?;
        Ok(response.visible.unwrap_or(false))
    }

    async fn bounding_box(&self, element: &ElementHandle) -> Result<Option<Rect>, DriverError> {
        let response = self
            .send(&BrowserRequest::BoundingBox { handle: element })
            .await?;
        Ok(response.rect)
    }

    async fn close(&self) -> Result<(), DriverError> {
        let Some(mut io) = self.io.lock().await.take() else {
            return Ok(());
        };

        // Best-effort quit; the process is killed regardless.
        if let Ok(json) = serde_json::to_string(&BrowserRequest::Quit) {
            let _ = io.stdin.write_all(format!("{}\n", json).as_bytes()).await;
            let _ = io.stdin.flush().await;
        }
        let _ = io.child.kill().await;
        tracing::debug!("browser server stopped");
        Ok(())
    }
}

/// Launches one [`BrowserServer`] per page.
#[derive(Debug, Clone)]
pub struct BrowserServerFactory {
    pub node: String,
    pub script: PathBuf,
}

#[async_trait]
impl PageFactory for BrowserServerFactory {
    async fn open_page(&self) -> Result<Arc<dyn AutomationDriver>, DriverError> {
        let server = BrowserServer::launch(&self.node, &self.script).await?;
        Ok(Arc::new(server))
    }
}
