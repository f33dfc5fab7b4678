//! Tab completion of command names.
//!
//! Candidates are builtin names plus every executable on `PATH`. Pressing Tab
//! repeatedly with the same prefix cycles through all matches and wraps.

use crate::builtin::Builtin;
use crate::external::executables_in_path;
use std::collections::BTreeSet;

/// Matches for one prefix and the position of the next one to hand out.
#[derive(Debug, Default)]
struct CompletionState {
    prefix: String,
    candidates: Vec<String>,
    cursor: usize,
    /// Text in front of the token being completed.
    head: String,
    /// The buffer returned by the previous call, if any.
    last_output: Option<String>,
}

/// Proposes completions for the token under the cursor.
///
/// One completer lives for a single line read; its cycling state is dropped
/// with it when the line is finished.
#[derive(Debug)]
pub struct Completer {
    search_path: Option<String>,
    universe: Option<BTreeSet<String>>,
    state: Option<CompletionState>,
}

impl Completer {
    /// Completer over builtins and the executables in `search_path`.
    ///
    /// `PATH` is only scanned the first time a completion is requested.
    pub fn new(search_path: Option<&str>) -> Self {
        Self {
            search_path: search_path.map(str::to_owned),
            universe: None,
            state: None,
        }
    }

    /// Completer over a fixed candidate list.
    pub fn with_candidates<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_path: None,
            universe: Some(candidates.into_iter().map(Into::into).collect()),
            state: None,
        }
    }

    fn universe(&mut self) -> &BTreeSet<String> {
        let search_path = self.search_path.as_deref();
        self.universe.get_or_insert_with(|| {
            let mut names = executables_in_path(search_path);
            names.extend(Builtin::ALL.iter().map(|b| b.name().to_string()));
            log::debug!("completion universe has {} names", names.len());
            names
        })
    }

    /// Complete the last token of `buffer`.
    ///
    /// Returns the new buffer with the token replaced by the next candidate and
    /// a trailing space, or `None` when nothing matches.
    pub fn complete(&mut self, buffer: &str) -> Option<String> {
        let continuing = self
            .state
            .as_ref()
            .is_some_and(|s| s.last_output.as_deref() == Some(buffer));

        if !continuing {
            let prefix = last_token(buffer);
            let head = buffer[..buffer.len() - prefix.len()].to_string();
            let same_prefix = self.state.as_ref().is_some_and(|s| s.prefix == prefix);
            if same_prefix {
                if let Some(state) = self.state.as_mut() {
                    state.head = head;
                }
            } else {
                let candidates: Vec<String> = self
                    .universe()
                    .iter()
                    .filter(|name| name.starts_with(prefix))
                    .cloned()
                    .collect();
                log::trace!("{} candidates for {prefix:?}", candidates.len());
                self.state = Some(CompletionState {
                    prefix: prefix.to_string(),
                    candidates,
                    cursor: 0,
                    head,
                    last_output: None,
                });
            }
        }

        let state = self.state.as_mut()?;
        if state.candidates.is_empty() {
            return None;
        }
        let output = format!("{}{} ", state.head, state.candidates[state.cursor]);
        state.cursor = (state.cursor + 1) % state.candidates.len();
        state.last_output = Some(output.clone());
        Some(output)
    }
}

/// The last whitespace-delimited token, or `""` if `buffer` ends in whitespace.
fn last_token(buffer: &str) -> &str {
    match buffer.rfind(char::is_whitespace) {
        Some(pos) => {
            let ws_len = buffer[pos..].chars().next().map_or(1, char::len_utf8);
            &buffer[pos + ws_len..]
        }
        None => buffer,
    }
}
