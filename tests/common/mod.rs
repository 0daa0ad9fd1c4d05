#![allow(dead_code)]

pub mod exchange {
    use std::borrow::Cow;

    use brrtrouter_cors::exchange::{BufferedExchange, ExchangeView};
    use http::Method;

    /// Wraps a [`BufferedExchange`] and records every mutating call, so tests
    /// can assert that nothing was attempted (not just that nothing stuck).
    #[derive(Debug, Clone)]
    pub struct RecordingExchange {
        pub inner: BufferedExchange,
        pub status_writes: Vec<u16>,
        pub header_writes: Vec<(String, String)>,
        pub resets: usize,
    }

    impl RecordingExchange {
        pub fn new(inner: BufferedExchange) -> Self {
            Self {
                inner,
                status_writes: Vec::new(),
                header_writes: Vec::new(),
                resets: 0,
            }
        }

        pub fn mutations(&self) -> usize {
            self.status_writes.len() + self.header_writes.len() + self.resets
        }

        pub fn header(&self, name: &str) -> Option<&str> {
            self.header_writes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    impl ExchangeView for RecordingExchange {
        fn header_first(&self, name: &str) -> Option<&str> {
            self.inner.header_first(name)
        }

        fn full_url(&self) -> Cow<'_, str> {
            self.inner.full_url()
        }

        fn method(&self) -> &Method {
            self.inner.method()
        }

        fn request_contains_cookies(&self) -> bool {
            self.inner.request_contains_cookies()
        }

        fn is_headers_sent(&self) -> bool {
            self.inner.is_headers_sent()
        }

        fn set_status_code(&mut self, status: u16) {
            self.status_writes.push(status);
            self.inner.set_status_code(status);
        }

        fn add_header_value(&mut self, name: &str, value: String) {
            self.header_writes.push((name.to_string(), value.clone()));
            self.inner.add_header_value(name, value);
        }

        fn reset_everything(&mut self) {
            self.resets += 1;
            self.inner.reset_everything();
        }
    }

    /// Cross-origin request to `http://api.local/pets` from `origin`.
    pub fn cross_origin(method: Method, origin: &str) -> BufferedExchange {
        BufferedExchange::new(method, "http://api.local/pets").with_header("Origin", origin)
    }

    /// Preflight asking to send `POST`.
    pub fn preflight(origin: &str) -> BufferedExchange {
        cross_origin(Method::OPTIONS, origin).with_header("Access-Control-Request-Method", "POST")
    }
}

pub mod logs {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing::subscriber::DefaultGuard;

    /// Captures JSON log lines emitted on the current thread.
    pub struct CapturedLogs {
        buf: Arc<Mutex<Vec<u8>>>,
        _guard: DefaultGuard,
    }

    struct SharedWriter(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedWriter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        pub fn init() -> Self {
            let buf = Arc::new(Mutex::new(Vec::new()));
            let writer = buf.clone();
            let subscriber = tracing_subscriber::fmt()
                .json()
                .with_max_level(tracing::Level::TRACE)
                .with_writer(move || SharedWriter(writer.clone()))
                .finish();
            let guard = tracing::subscriber::set_default(subscriber);
            Self { buf, _guard: guard }
        }

        /// Parsed log lines
        pub fn events(&self) -> Vec<serde_json::Value> {
            let raw = self.buf.lock().unwrap().clone();
            String::from_utf8_lossy(&raw)
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }

        /// Levels of events whose message contains `needle`
        pub fn levels_for(&self, needle: &str) -> Vec<String> {
            self.events()
                .into_iter()
                .filter(|e| {
                    e["fields"]["message"]
                        .as_str()
                        .is_some_and(|m| m.contains(needle))
                })
                .filter_map(|e| e["level"].as_str().map(str::to_string))
                .collect()
        }
    }
}

pub mod temp_files {
    use std::io::Write;

    use tempfile::NamedTempFile;

    /// Write `content` to a temporary `.yaml` file that lives as long as the handle.
    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("brrtr_cors_")
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }
}
