// src/fsprotect/rules.rs

//! Built-in protection rules per platform

use std::path::{Path, PathBuf};

/// Directory names protected anywhere as version control metadata
pub const VERSION_CONTROL_DIRECTORIES: &[&str] = &[".git", ".svn", ".hg", ".bzr", ".jj", "_darcs"];

/// Directory names protected anywhere as hidden tool state
pub const CONCEALED_DIRECTORIES: &[&str] = &[
    ".vscode",
    ".idea",
    ".vs",
    ".fleet",
    ".direnv",
    ".terraform",
];

/// Home-relative credential stores
pub const CREDENTIAL_LOCATIONS: &[&str] = &[
    ".ssh",
    ".gnupg",
    ".aws",
    ".azure",
    ".kube",
    ".docker",
    ".config/gcloud",
    ".config/gh",
    ".password-store",
    ".netrc",
    ".pgpass",
    ".npmrc",
    ".pypirc",
    ".git-credentials",
    ".cargo/credentials",
    ".cargo/credentials.toml",
];

/// Credential file patterns protected anywhere
pub const CREDENTIAL_PATTERNS: &[&str] = &[
    "**/.env",
    "**/.env.*",
    "**/*.pem",
    "**/*.key",
    "**/*.p12",
    "**/*.pfx",
    "**/id_rsa*",
    "**/id_ed25519*",
    "**/id_ecdsa*",
];

/// Operating system directories
pub fn os_directories() -> Vec<PathBuf> {
    let names: &[&str] = if cfg!(windows) {
        &[
            "C:\\Windows",
            "C:\\Program Files",
            "C:\\Program Files (x86)",
            "C:\\ProgramData",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/System",
            "/Library",
            "/Applications",
            "/bin",
            "/sbin",
            "/usr",
            "/etc",
            "/opt",
        ]
    } else {
        &[
            "/bin", "/boot", "/dev", "/etc", "/lib", "/lib32", "/lib64", "/opt", "/proc", "/run",
            "/sbin", "/srv", "/sys", "/usr", "/var",
        ]
    };
    let mut directories: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
    if cfg!(windows)
        && let Ok(root) = std::env::var("SystemRoot")
    {
        directories.push(PathBuf::from(root));
    }
    directories
}

/// Sensitive user directories specific to the platform
pub fn platform_user_directories(home: &Path) -> Vec<PathBuf> {
    let relative: &[&str] = if cfg!(windows) {
        &["AppData", "NTUSER.DAT"]
    } else if cfg!(target_os = "macos") {
        &["Library", ".Trash"]
    } else {
        &[".local/share/keyrings", ".local/share/Trash", ".pki"]
    };
    relative.iter().map(|r| home.join(r)).collect()
}

/// Credential stores resolved against `home`
pub fn credential_directories(home: &Path) -> Vec<PathBuf> {
    CREDENTIAL_LOCATIONS.iter().map(|r| home.join(r)).collect()
}

/// `**/<name>/**` patterns for directory names
pub fn anywhere_patterns(names: &[&str]) -> Vec<String> {
    names
        .iter()
        .flat_map(|name| [format!("**/{name}"), format!("**/{name}/**")])
        .collect()
}
