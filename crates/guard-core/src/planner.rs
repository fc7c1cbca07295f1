//! Fix planning
//!
//! Turns a [`FixAction`] into the shell commands that carry it out. Only
//! files under the asset root are ever touched.

use crate::config::{to_slash, GuardConfig};
use crate::fix::FixAction;
use crate::rewrite::{shell_quote, shell_quote_path, ReferenceRewrite};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Suffix of the temporary file used while recompressing
const CRUSH_SUFFIX: &str = ".crushed";

/// Extension produced by opaque conversion
const OPAQUE_EXTENSION: &str = "jpg";

/// JPEG quality used for opaque conversion
const OPAQUE_QUALITY: u8 = 92;

/// Expands fix actions into commands
#[derive(Debug, Clone)]
pub struct FixPlanner {
    config: Arc<GuardConfig>,
}

impl FixPlanner {
    /// Create planner
    #[inline]
    #[must_use]
    pub fn new(config: Arc<GuardConfig>) -> Self {
        Self { config }
    }

    /// Commands implementing `fix`, empty when the file is outside the asset root
    #[must_use]
    pub fn plan(&self, fix: &FixAction) -> Vec<String> {
        let path = fix.path();
        let Some(relative) = self.config.asset_relative(path) else {
            tracing::debug!(path = %path.display(), fix = fix.name(), "outside asset root, no commands");
            return Vec::new();
        };

        match fix {
            FixAction::Compress(_) => self.compress(path),
            FixAction::ConvertToOpaqueFormat(_) => self.convert(path, &relative),
            FixAction::RenameToConvention(_) => self.rename(path, &relative),
        }
    }

    fn compress(&self, path: &Path) -> Vec<String> {
        let mut temp = path.as_os_str().to_owned();
        temp.push(CRUSH_SUFFIX);
        let temp = PathBuf::from(temp);

        vec![
            format!(
                "pngcrush -q {} {}",
                shell_quote_path(path),
                shell_quote_path(&temp)
            ),
            format!("mv -f {} {}", shell_quote_path(&temp), shell_quote_path(path)),
        ]
    }

    fn convert(&self, path: &Path, relative: &Path) -> Vec<String> {
        let target = path.with_extension(OPAQUE_EXTENSION);
        let new_relative = relative.with_extension(OPAQUE_EXTENSION);

        let mut commands = vec![
            format!(
                "{} convert {} -quality {OPAQUE_QUALITY} {}",
                shell_quote(&self.config.probe_program),
                shell_quote_path(path),
                shell_quote_path(&target)
            ),
            format!("rm -f {}", shell_quote_path(path)),
        ];
        commands.extend(
            ReferenceRewrite::new(to_slash(relative), to_slash(&new_relative)).commands(&self.config),
        );
        commands
    }

    fn rename(&self, path: &Path, relative: &Path) -> Vec<String> {
        let old_relative = to_slash(relative);
        let new_relative = self.config.naming.normalize(&old_relative);
        if new_relative == old_relative {
            return Vec::new();
        }

        let target = self.config.asset_root().join(&new_relative);
        let mut commands = Vec::new();

        if let Some(parent) = target.parent() {
            if Some(parent) != path.parent() {
                commands.push(format!("mkdir -p {}", shell_quote_path(parent)));
            }
        }
        commands.push(format!(
            "mv {} {}",
            shell_quote_path(path),
            shell_quote_path(&target)
        ));
        commands.extend(ReferenceRewrite::new(old_relative, new_relative).commands(&self.config));
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guard_policy::NamingConvention;
    use pretty_assertions::assert_eq;

    fn planner(naming: NamingConvention) -> FixPlanner {
        FixPlanner::new(Arc::new(GuardConfig::new("/site").with_naming(naming)))
    }

    fn asset(rel: &str) -> PathBuf {
        Path::new("/site/src/assets").join(rel)
    }

    #[test]
    fn compress_goes_through_temporary_sibling() {
        let commands = planner(NamingConvention::Lowercase).plan(&FixAction::Compress(asset("img/a.png")));
        assert_eq!(
            commands,
            vec![
                "pngcrush -q '/site/src/assets/img/a.png' '/site/src/assets/img/a.png.crushed'",
                "mv -f '/site/src/assets/img/a.png.crushed' '/site/src/assets/img/a.png'",
            ]
        );
    }

    #[test]
    fn convert_removes_original_and_rewrites() {
        let commands = planner(NamingConvention::Lowercase)
            .plan(&FixAction::ConvertToOpaqueFormat(asset("img/flat.png")));

        assert_eq!(
            commands[0],
            "'gm' convert '/site/src/assets/img/flat.png' -quality 92 '/site/src/assets/img/flat.jpg'"
        );
        assert_eq!(commands[1], "rm -f '/site/src/assets/img/flat.png'");
        assert_eq!(commands.len(), 2 + 3);
        assert!(commands[2..].iter().all(|c| c.contains(r"s/img\/flat\.png/img\/flat.jpg/g")));
    }

    #[test]
    fn rename_lowercases_and_creates_directory() {
        let commands = planner(NamingConvention::Lowercase)
            .plan(&FixAction::RenameToConvention(asset("Photos/My Photo.JPG")));

        assert_eq!(commands[0], "mkdir -p '/site/src/assets/photos'");
        assert_eq!(
            commands[1],
            "mv '/site/src/assets/Photos/My Photo.JPG' '/site/src/assets/photos/my_photo.jpg'"
        );
        assert_eq!(commands.len(), 2 + 3);
    }

    #[test]
    fn rename_in_same_directory_skips_mkdir() {
        let commands = planner(NamingConvention::Lowercase)
            .plan(&FixAction::RenameToConvention(asset("img/My Photo.JPG")));

        assert_eq!(
            commands[0],
            "mv '/site/src/assets/img/My Photo.JPG' '/site/src/assets/img/my_photo.jpg'"
        );
        assert_eq!(commands.len(), 1 + 3);
    }

    #[test]
    fn underscore_generation_keeps_case() {
        let commands = planner(NamingConvention::Underscore)
            .plan(&FixAction::RenameToConvention(asset("img/My Photo.JPG")));
        assert_eq!(
            commands[0],
            "mv '/site/src/assets/img/My Photo.JPG' '/site/src/assets/img/My_Photo.JPG'"
        );
    }

    #[test]
    fn outside_asset_root_yields_nothing() {
        let p = planner(NamingConvention::Lowercase);
        assert!(p.plan(&FixAction::RenameToConvention(PathBuf::from("/site/My File.txt"))).is_empty());
        assert!(p.plan(&FixAction::Compress(PathBuf::from("/tmp/a.png"))).is_empty());
    }

    #[test]
    fn already_conforming_rename_is_empty() {
        let p = planner(NamingConvention::Underscore);
        assert!(p.plan(&FixAction::RenameToConvention(asset("img/Upper.png"))).is_empty());
    }
}
