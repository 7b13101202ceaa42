use log_manager::{LogManager, LoggerRegistry};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap().lines().map(ToOwned::to_owned).collect()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path).unwrap().lines().map(ToOwned::to_owned).collect()
}

fn write_config(dir: &Path, json: &str) -> PathBuf {
    let config_path = dir.join("logger.json");
    std::fs::write(&config_path, json).unwrap();
    config_path
}

#[test]
fn should_echo_each_line_to_the_console() {
    // Arrange
    let tempdir = tempfile::tempdir().unwrap();
    let config_path = write_config(tempdir.path(), r#"{"stdout":"True"}"#);
    let console = SharedBuffer::default();
    let registry = LoggerRegistry::new();
    let logger = LogManager::builder()
        .registry(&registry)
        .name("it.stdout")
        .config_path(&config_path)
        .base_dir(tempdir.path())
        .console_writer(console.clone())
        .build()
        .unwrap();

    // Act
    logger.info("first");
    logger.error("second");

    // Assert
    assert!(logger.stdout_enabled());
    let file_lines = read_lines(&logger.log_path());
    let console_lines = console.lines();
    assert_eq!(2, file_lines.len());
    assert_eq!(2, console_lines.len());
    for (file_line, console_line) in file_lines.iter().zip(console_lines.iter()) {
        let file_message = &file_line[file_line.find(']').unwrap()..];
        let console_message = &console_line[console_line.find(']').unwrap()..];
        assert_eq!(file_message, console_message);
    }
    assert!(console_lines[0].starts_with("INFO ["));
    assert!(console_lines[1].starts_with("ERROR ["));
}

#[test]
fn should_not_echo_unless_stdout_is_exactly_true() {
    for json in &[
        r#"{"stdout":"False"}"#,
        r#"{"stdout":"true"}"#,
        r#"{"stdout":true}"#,
        r#"{"stdout":false}"#,
        r#"{"stdout":null}"#,
        r#"{}"#,
    ] {
        let tempdir = tempfile::tempdir().unwrap();
        let config_path = write_config(tempdir.path(), json);
        let console = SharedBuffer::default();
        let registry = LoggerRegistry::new();
        let logger = LogManager::builder()
            .registry(&registry)
            .name("it.no_stdout")
            .config_path(&config_path)
            .base_dir(tempdir.path())
            .console_writer(console.clone())
            .build()
            .unwrap();

        logger.info("file only");

        assert!(!logger.stdout_enabled(), "{}", json);
        assert_eq!(1, read_lines(&logger.log_path()).len());
        assert!(console.lines().is_empty(), "{}", json);
    }
}

#[test]
fn disabling_stdout_should_remove_the_console_handler() {
    let tempdir = tempfile::tempdir().unwrap();
    let console = SharedBuffer::default();
    let registry = LoggerRegistry::new();
    let stdout_config = write_config(tempdir.path(), r#"{"stdout":"True"}"#);
    let logger = LogManager::builder()
        .registry(&registry)
        .name("it.toggle")
        .config_path(&stdout_config)
        .base_dir(tempdir.path())
        .console_writer(console.clone())
        .build()
        .unwrap();
    logger.info("echoed");

    LogManager::builder()
        .registry(&registry)
        .name("it.toggle")
        .base_dir(tempdir.path())
        .build()
        .unwrap();
    logger.info("not echoed");

    assert!(!logger.stdout_enabled());
    assert_eq!(2, read_lines(&logger.log_path()).len());
    let console_lines = console.lines();
    assert_eq!(1, console_lines.len());
    assert!(console_lines[0].ends_with("echoed"));
}
