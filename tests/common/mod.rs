// 集成测试共用的工作区替身与样例数据
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use paste_image_rename::error::AppError;
use paste_image_rename::paste::PasteHandler;
use paste_image_rename::settings::Settings;
use paste_image_rename::vault::{EditorLine, LocalVault, VaultFile, Workspace};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 内存中的编辑器 + 元数据
pub struct MemoryWorkspace {
    active: Mutex<Option<VaultFile>>,
    frontmatter: Mutex<HashMap<String, String>>,
    lines: Mutex<Vec<String>>,
    cursor: Mutex<usize>,
    editor_open: AtomicBool,
    notices: Mutex<Vec<String>>,
    pixel_ratio: f64,
}

impl MemoryWorkspace {
    pub fn new(active: Option<VaultFile>, lines: &[&str], cursor: usize) -> Self {
        Self {
            active: Mutex::new(active),
            frontmatter: Mutex::new(HashMap::new()),
            lines: Mutex::new(lines.iter().map(|l| l.to_string()).collect()),
            cursor: Mutex::new(cursor),
            editor_open: AtomicBool::new(true),
            notices: Mutex::new(Vec::new()),
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    pub fn set_frontmatter(&self, key: &str, value: &str) {
        self.frontmatter
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn close_editor(&self) {
        self.editor_open.store(false, Ordering::SeqCst);
    }

    pub fn set_line(&self, number: usize, text: &str) {
        self.lines.lock().unwrap()[number] = text.to_string();
        *self.cursor.lock().unwrap() = number;
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl Workspace for MemoryWorkspace {
    fn active_file(&self) -> Option<VaultFile> {
        self.active.lock().unwrap().clone()
    }

    fn frontmatter_value(&self, _file: &VaultFile, key: &str) -> Option<String> {
        self.frontmatter.lock().unwrap().get(key).cloned()
    }

    fn generate_link(&self, target: &VaultFile, _source_path: &str) -> String {
        format!("![[{}]]", target.path)
    }

    fn cursor_line(&self, source_path: &str) -> Option<EditorLine> {
        if !self.editor_open.load(Ordering::SeqCst) {
            return None;
        }
        let active = self.active.lock().unwrap().clone()?;
        if active.path != source_path {
            return None;
        }
        let number = *self.cursor.lock().unwrap();
        let text = self.lines.lock().unwrap().get(number)?.clone();
        Some(EditorLine { number, text })
    }

    fn replace_line(&self, _source_path: &str, line: usize, text: &str) -> Result<(), AppError> {
        let mut lines = self.lines.lock().unwrap();
        let slot = lines
            .get_mut(line)
            .ok_or_else(|| AppError::Precondition(format!("行号越界：{}", line)))?;
        *slot = text.to_string();
        Ok(())
    }

    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
    });
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

pub fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgba([10, 20, 30, 255]));
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Gif)
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, format)
        .expect("failed to encode test image");
    cursor.into_inner()
}

pub fn write_file(root: &Path, vault_path: &str, bytes: &[u8]) {
    let absolute = root.join(vault_path);
    if let Some(parent) = absolute.parent() {
        std::fs::create_dir_all(parent).expect("mkdir failed");
    }
    std::fs::write(absolute, bytes).expect("write failed");
}

/// `hello.md` 在库根，编辑器第 1 行是粘贴生成的链接
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub vault: Arc<LocalVault>,
    pub workspace: Arc<MemoryWorkspace>,
    pub handler: Arc<PasteHandler<LocalVault, MemoryWorkspace>>,
}

impl Fixture {
    pub async fn new(settings: Settings, pasted: &[(&str, Vec<u8>)]) -> Self {
        Self::with_workspace(settings, pasted, |ws| ws).await
    }

    pub async fn with_workspace(
        settings: Settings,
        pasted: &[(&str, Vec<u8>)],
        customize: impl FnOnce(MemoryWorkspace) -> MemoryWorkspace,
    ) -> Self {
        init_logger();
        let dir = tempfile::tempdir().expect("tempdir failed");
        write_file(dir.path(), "hello.md", b"# hello\n");
        for (path, bytes) in pasted {
            write_file(dir.path(), path, bytes);
        }

        let vault = Arc::new(LocalVault::new(dir.path()));
        let note = vault.file("hello.md").await.expect("note should exist");
        let first_link = pasted
            .first()
            .map(|(path, _)| format!("before ![[{}]] after", path))
            .unwrap_or_default();
        let workspace = Arc::new(customize(MemoryWorkspace::new(
            Some(note),
            &["# hello", &first_link],
            1,
        )));
        let handler = Arc::new(
            PasteHandler::new(Arc::clone(&vault), Arc::clone(&workspace), settings)
                .expect("settings should be valid"),
        );

        Self {
            dir,
            vault,
            workspace,
            handler,
        }
    }

    pub fn exists(&self, vault_path: &str) -> bool {
        self.dir.path().join(vault_path).exists()
    }

    pub fn read(&self, vault_path: &str) -> Vec<u8> {
        std::fs::read(self.dir.path().join(vault_path)).expect("read failed")
    }
}

pub fn paste_settings() -> Settings {
    Settings {
        image_name_pattern: "{{fileName}}".to_string(),
        auto_rename: true,
        auto_move: true,
        dirpath: "image/".to_string(),
        png_to_jpeg: true,
        quality: 0.6,
        dup_number_always: true,
        ..Settings::default()
    }
}
