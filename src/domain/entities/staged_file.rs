//! # Staged Files
//!
//! アップロード前にステージされたファイルと、その集合（FileSet）

use std::path::{Path, PathBuf};

use crate::domain::errors::SessionError;

/// 受け付けるアセンブリファイルの拡張子
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["fasta", "fa", "fna"];

/// パスが受け付け可能な拡張子を持つかどうか（大文字小文字は区別しない）
pub fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

/// ステージされたファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// ファイル名（FileSet内で一意）
    pub name: String,
    /// アップロード時に読み込むローカルパス
    pub path: PathBuf,
}

impl StagedFile {
    /// パスからステージファイルを作成
    ///
    /// # Errors
    ///
    /// 拡張子が `.fasta` / `.fa` / `.fna` 以外の場合は `UnsupportedFileType`
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        if !has_accepted_extension(&path) {
            return Err(SessionError::UnsupportedFileType(name));
        }

        Ok(Self { name, path })
    }
}

/// ファイル集合
///
/// 追加順を保持し、名前で一意
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: Vec<StagedFile>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// ファイルを追加
    ///
    /// # Errors
    ///
    /// 同名のファイルが既に存在する場合は `DuplicateFile`
    pub fn stage(&mut self, file: StagedFile) -> Result<(), SessionError> {
        if self.contains(&file.name) {
            return Err(SessionError::DuplicateFile(file.name));
        }
        self.files.push(file);
        Ok(())
    }

    /// 名前でファイルを取り除く。存在しなければ `false`
    pub fn unstage(&mut self, name: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.name != name);
        self.files.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.name.clone()).collect()
    }
}
