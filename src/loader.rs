use std::collections::VecDeque;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::grid::Grid;
use crate::grid::GridParseError;

/// Line separating two mazes within the same file.
pub const MAZE_SEPARATOR: &str = "---";
/// Extension picked up when a directory is given instead of a file.
pub const MAZE_EXTENSION: &str = "maze";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error when loading '{path}': {e}")]
    Io { path: PathBuf, e: std::io::Error },
    #[error("Maze #{index} in '{path}' is invalid: {e}")]
    Parse {
        path: PathBuf,
        index: usize,
        e: GridParseError,
    },
    #[error("Invalid maze pattern '{pattern}': {e}")]
    Pattern {
        pattern: String,
        e: glob::PatternError,
    },
}

/// Splits a file into the text of each maze it holds.
///
/// Chunks with nothing but blanks and comments are skipped.
pub fn split_mazes(s: &str) -> Vec<String> {
    let mut mazes = vec![];
    let mut current = String::new();
    for line in s.lines() {
        if line.trim() == MAZE_SEPARATOR {
            mazes.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    mazes.push(current);

    mazes.retain(|maze| {
        maze.lines()
            .map(str::trim)
            .any(|line| !line.is_empty() && !line.starts_with(crate::grid::COMMENT_PREFIX))
    });
    mazes
}

/// Hands out the mazes of a list of files, one at a time.
///
/// Files are only read once the mazes before them were consumed.
#[derive(Debug, Default)]
pub struct MazeLoader {
    paths: VecDeque<PathBuf>,
    /// File being consumed, with the index of its next maze.
    current: Option<(PathBuf, usize)>,
    pending: VecDeque<String>,
}

impl MazeLoader {
    pub fn new<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        Self {
            paths: paths.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Like `new()`, but replaces directories by the maze files they contain.
    pub fn from_paths<I: IntoIterator<Item = PathBuf>>(paths: I) -> Result<Self, LoadError> {
        let mut files = vec![];
        for path in paths {
            if path.is_dir() {
                files.extend(maze_files(&path)?);
            } else {
                files.push(path);
            }
        }
        Ok(Self::new(files))
    }

    /// Files not opened yet.
    pub fn remaining_files(&self) -> usize {
        self.paths.len()
    }

    /// The next maze, or `None` once every file was consumed.
    pub fn load_next(&mut self) -> Result<Option<Grid>, LoadError> {
        while self.pending.is_empty() {
            let Some(path) = self.paths.pop_front() else {
                self.current = None;
                return Ok(None);
            };
            let contents = std::fs::read_to_string(&path).map_err(|e| LoadError::Io {
                path: path.clone(),
                e,
            })?;
            self.pending = split_mazes(&contents).into();
            if self.pending.is_empty() {
                log::warn!("No mazes in {path:?}");
            }
            self.current = Some((path, 0));
        }

        let (Some(maze), Some((path, index))) = (self.pending.pop_front(), self.current.as_mut())
        else {
            return Ok(None);
        };
        let this = *index;
        *index += 1;
        let grid = Grid::try_from(maze.as_str()).map_err(|e| LoadError::Parse {
            path: path.clone(),
            index: this,
            e,
        })?;
        log::debug!("Loaded maze #{this} from {path:?}: {grid:?}");
        Ok(Some(grid))
    }
}

impl Iterator for MazeLoader {
    type Item = Result<Grid, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.load_next().transpose()
    }
}

/// Maze files directly under `dir`, sorted by name.
pub fn maze_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let pattern = dir.join(format!("*.{MAZE_EXTENSION}"));
    let pattern = pattern.to_string_lossy().into_owned();
    let entries = glob::glob(&pattern).map_err(|e| LoadError::Pattern {
        pattern: pattern.clone(),
        e,
    })?;

    let mut files = vec![];
    for entry in entries {
        match entry {
            Ok(path) => files.push(path),
            Err(e) => log::warn!("Skipping unreadable entry: {e}"),
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;

    use crate::movement::Position;

    /// A fresh directory under the system temporary directory.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("maze-search-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const TWO_MAZES: &str = indoc! {"
        % Two mazes
        1 0
        1 1
        ---
        threshold 3
        start 2 1
        1 1 1
        # # 1
        0 1 1
        ---
        % trailing separator
    "};

    #[test]
    fn split_skips_empty_chunks() {
        let mazes = split_mazes(TWO_MAZES);
        assert_eq!(mazes.len(), 2);
        assert!(mazes[1].starts_with("threshold 3"));
        assert!(split_mazes("% nothing\n\n---\n").is_empty());
    }

    #[test]
    fn loads_every_maze_of_every_file() {
        let dir = scratch_dir("load");
        std::fs::write(dir.join("a.maze"), TWO_MAZES).unwrap();
        std::fs::write(dir.join("b.maze"), "0").unwrap();
        std::fs::write(dir.join("notes.txt"), "not a maze").unwrap();

        let mut loader = MazeLoader::from_paths([dir.clone()]).unwrap();
        assert_eq!(loader.remaining_files(), 2);

        let first = loader.load_next().unwrap().unwrap();
        assert_eq!(first.dimension(), 2);
        let second = loader.load_next().unwrap().unwrap();
        assert_eq!(second.threshold(), 3);
        assert_eq!(second.start(), Position::new(2, 1));
        let third = loader.load_next().unwrap().unwrap();
        assert_eq!(third.goals(), &[Position::ORIGIN]);

        assert!(loader.load_next().unwrap().is_none());
        assert!(loader.load_next().unwrap().is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn reports_where_a_maze_is_broken() {
        let dir = scratch_dir("broken");
        let path = dir.join("broken.maze");
        std::fs::write(&path, "1 0\n1 1\n---\n1 x\n1 0\n").unwrap();

        let mut loader = MazeLoader::new([path.clone()]);
        assert!(loader.next().unwrap().is_ok());
        match loader.next() {
            Some(Err(LoadError::Parse { path: p, index, .. })) => {
                assert_eq!(p, path);
                assert_eq!(index, 1);
            }
            other => panic!("Expected a parse error, got {other:?}"),
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_files_are_io_errors() {
        let mut loader = MazeLoader::new([PathBuf::from("/nonexistent/maze-search.maze")]);
        assert!(matches!(loader.load_next(), Err(LoadError::Io { .. })));
    }
}
