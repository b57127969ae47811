// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory git stand-in for mirror and sync tests.
//!
//! ```text
//! remotes (by URL)            mirrors (on disk, under a temp dir)
//!   refs: name -> oid           <dir>/refs/         marker
//!   HEAD: refs/heads/main       <dir>/packed-refs   "oid name" lines
//!                               <dir>/config        origin URL
//!   commit graph (oid -> parents) shared by all remotes
//! ```
//!
//! Every invocation marks its mirror location busy for its duration;
//! a second invocation on a busy location sets the overlap flag.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::error::{MirrorResult, ProcessError};
use crate::git::invoker::{CommandInvoker, Invocation, InvocationOutput};

pub(crate) const MAIN: &str = "refs/heads/main";

/// Injected misbehaviour for one git subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    /// Exit with this code and a stderr message.
    Exit(i32),
    /// Scribble over `packed-refs`, then exit 1.
    CorruptThenExit,
    /// Replace the whole location with a plain file, then exit 1.
    ClobberThenExit,
    /// Return a timeout error as a real invoker would after killing the child.
    Timeout,
    /// Panic inside the invoker.
    Panic,
}

/// Which locations a failure applies to.
#[derive(Debug, Clone)]
enum Scope {
    Everywhere,
    Containing(String),
    Exactly(PathBuf),
}

impl Scope {
    fn matches(&self, location: &Path) -> bool {
        match self {
            Self::Everywhere => true,
            Self::Containing(needle) => location.to_string_lossy().contains(needle.as_str()),
            Self::Exactly(path) => location == path,
        }
    }
}

#[derive(Debug, Clone)]
struct Remote {
    refs: BTreeMap<String, String>,
    head: String,
}

#[derive(Default)]
struct State {
    remotes: BTreeMap<String, Remote>,
    parents: BTreeMap<String, Vec<String>>,
    next_oid: u64,
}

impl State {
    fn new_commit(&mut self, parents: Vec<String>) -> String {
        self.next_oid += 1;
        let oid = format!("{:040x}", self.next_oid);
        self.parents.insert(oid.clone(), parents);
        oid
    }

    fn ancestors(&self, oid: &str) -> Option<BTreeSet<String>> {
        if !self.parents.contains_key(oid) {
            return None;
        }
        let mut seen = BTreeSet::new();
        let mut stack = vec![oid.to_string()];
        while let Some(current) = stack.pop() {
            if seen.insert(current.clone())
                && let Some(parents) = self.parents.get(&current)
            {
                stack.extend(parents.iter().cloned());
            }
        }
        Some(seen)
    }
}

#[derive(Default)]
pub(crate) struct FakeGit {
    state: Mutex<State>,
    failures: Mutex<Vec<(String, Scope, Failure)>>,
    calls: Mutex<Vec<Invocation>>,
    busy: Mutex<BTreeSet<PathBuf>>,
    overlap: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
}

struct BusyGuard<'a> {
    fake: &'a FakeGit,
    location: PathBuf,
    owned: bool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.fake.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.owned {
            self.fake.busy.lock().unwrap().remove(&self.location);
        }
    }
}

impl FakeGit {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fake that holds each invocation open for `delay`.
    pub(crate) fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    // --- remote side ---

    /// Creates a remote with one commit on `main`; returns that commit.
    pub(crate) fn create_remote(&self, url: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let root = state.new_commit(Vec::new());
        let mut refs = BTreeMap::new();
        refs.insert(MAIN.to_string(), root.clone());
        state.remotes.insert(
            url.to_string(),
            Remote {
                refs,
                head: MAIN.to_string(),
            },
        );
        root
    }

    /// Adds a commit on top of `refname` (fast-forward); returns it.
    pub(crate) fn push(&self, url: &str, refname: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let tip = state.remotes[url].refs.get(refname).cloned();
        let oid = state.new_commit(tip.into_iter().collect());
        state
            .remotes
            .get_mut(url)
            .unwrap()
            .refs
            .insert(refname.to_string(), oid.clone());
        oid
    }

    /// Replaces the tip of `refname` with a sibling commit; returns it.
    pub(crate) fn force_push(&self, url: &str, refname: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let tip = state.remotes[url].refs[refname].clone();
        let parents = state.parents[&tip].clone();
        let oid = state.new_commit(parents);
        state
            .remotes
            .get_mut(url)
            .unwrap()
            .refs
            .insert(refname.to_string(), oid.clone());
        oid
    }

    /// Adds a ref pointing at the current `main` tip.
    pub(crate) fn add_ref(&self, url: &str, refname: &str) {
        let mut state = self.state.lock().unwrap();
        let remote = state.remotes.get_mut(url).unwrap();
        let tip = remote.refs[MAIN].clone();
        remote.refs.insert(refname.to_string(), tip);
    }

    pub(crate) fn remote_tip(&self, url: &str, refname: &str) -> Option<String> {
        self.state.lock().unwrap().remotes[url].refs.get(refname).cloned()
    }

    // --- failure injection and observation ---

    /// Makes every invocation of `subcommand` misbehave.
    pub(crate) fn fail(&self, subcommand: &str, failure: Failure) {
        self.push_failure(subcommand, Scope::Everywhere, failure);
    }

    /// Makes `subcommand` misbehave only for locations containing `needle`.
    pub(crate) fn fail_at(&self, subcommand: &str, needle: &str, failure: Failure) {
        self.push_failure(subcommand, Scope::Containing(needle.to_string()), failure);
    }

    /// Makes `subcommand` misbehave only when run in exactly `location`.
    pub(crate) fn fail_in(&self, subcommand: &str, location: &Path, failure: Failure) {
        self.push_failure(subcommand, Scope::Exactly(location.to_path_buf()), failure);
    }

    fn push_failure(&self, subcommand: &str, scope: Scope, failure: Failure) {
        self.failures
            .lock()
            .unwrap()
            .push((subcommand.to_string(), scope, failure));
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Subcommands invoked for locations containing `needle`, in order.
    pub(crate) fn subcommands_at(&self, needle: &str) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|call| location_of(call).to_string_lossy().contains(needle))
            .filter_map(|call| call.subcommand().map(str::to_string))
            .collect()
    }

    /// Subcommands invoked in exactly `location`, in order.
    pub(crate) fn subcommands_in(&self, location: &Path) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|call| location_of(call) == location)
            .filter_map(|call| call.subcommand().map(str::to_string))
            .collect()
    }

    pub(crate) fn saw_overlap(&self) -> bool {
        self.overlap.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Reads the primary ref of a mirror from disk.
    pub(crate) fn mirror_ref(mirror: &Path, refname: &str) -> Option<String> {
        read_packed_refs(mirror).ok()?.get(refname).cloned()
    }

    // --- invocation handling ---

    fn enter(&self, location: PathBuf) -> BusyGuard<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let owned = self.busy.lock().unwrap().insert(location.clone());
        if !owned {
            self.overlap.store(true, Ordering::SeqCst);
        }
        BusyGuard {
            fake: self,
            location,
            owned,
        }
    }

    fn failure_for(&self, invocation: &Invocation, location: &Path) -> Option<Failure> {
        let subcommand = invocation.subcommand()?;
        self.failures
            .lock()
            .unwrap()
            .iter()
            .find(|(sub, scope, _)| sub == subcommand && scope.matches(location))
            .map(|(_, _, failure)| *failure)
    }

    fn execute(&self, invocation: &Invocation, location: &Path) -> InvocationOutput {
        let args: Vec<&str> = invocation.args().iter().map(String::as_str).collect();
        let result = match args.as_slice() {
            ["clone", "--mirror", "--quiet", url, dest] => self.clone_mirror(url, Path::new(dest)),
            ["remote", "update"] => self.remote_update(location),
            ["for-each-ref", _format] => for_each_ref(location),
            ["symbolic-ref", "-q", "HEAD"] => std::fs::read_to_string(location.join("HEAD"))
                .map(|head| {
                    InvocationOutput::success(head.trim().trim_start_matches("ref: ").to_string())
                })
                .map_err(|e| e.to_string()),
            ["rev-list", "--left-right", "--count", range] => self.left_right(range),
            ["ls-remote", "--exit-code", "origin", refname] => self.ls_remote(location, refname),
            ["update-ref", refname, oid] => update_ref(location, refname, oid),
            _ => Err(format!("unsupported fake invocation: {invocation}")),
        };
        result.unwrap_or_else(|message| InvocationOutput::failure(128, format!("fatal: {message}")))
    }

    fn clone_mirror(&self, url: &str, dest: &Path) -> Result<InvocationOutput, String> {
        let remote = self
            .state
            .lock()
            .unwrap()
            .remotes
            .get(url)
            .cloned()
            .ok_or_else(|| format!("repository '{url}' not found"))?;
        if dest.exists() && std::fs::read_dir(dest).map_err(|e| e.to_string())?.next().is_some() {
            return Err(format!("destination path '{}' already exists", dest.display()));
        }
        std::fs::create_dir_all(dest.join("refs/heads")).map_err(|e| e.to_string())?;
        std::fs::create_dir_all(dest.join("objects")).map_err(|e| e.to_string())?;
        std::fs::write(dest.join("config"), format!("url = {url}\n")).map_err(|e| e.to_string())?;
        std::fs::write(dest.join("HEAD"), format!("ref: {}\n", remote.head)).map_err(|e| e.to_string())?;
        write_packed_refs(dest, &remote.refs)?;
        Ok(InvocationOutput::success(""))
    }

    fn remote_for(&self, mirror: &Path) -> Result<Remote, String> {
        let config = std::fs::read_to_string(mirror.join("config")).map_err(|e| e.to_string())?;
        let url = config
            .trim()
            .strip_prefix("url = ")
            .ok_or("no origin configured")?;
        self.state
            .lock()
            .unwrap()
            .remotes
            .get(url)
            .cloned()
            .ok_or_else(|| format!("repository '{url}' not found"))
    }

    fn remote_update(&self, mirror: &Path) -> Result<InvocationOutput, String> {
        let remote = self.remote_for(mirror)?;
        write_packed_refs(mirror, &remote.refs)?;
        Ok(InvocationOutput::success("Fetching origin"))
    }

    fn left_right(&self, range: &str) -> Result<InvocationOutput, String> {
        let (left, right) = range.split_once("...").ok_or("bad range")?;
        let state = self.state.lock().unwrap();
        let left = state.ancestors(left).ok_or("bad revision")?;
        let right = state.ancestors(right).ok_or("bad revision")?;
        Ok(InvocationOutput::success(format!(
            "{}\t{}\n",
            left.difference(&right).count(),
            right.difference(&left).count()
        )))
    }

    fn ls_remote(&self, mirror: &Path, refname: &str) -> Result<InvocationOutput, String> {
        let remote = self.remote_for(mirror)?;
        Ok(remote.refs.get(refname).map_or_else(
            || InvocationOutput::failure(2, ""),
            |oid| InvocationOutput::success(format!("{oid}\t{refname}\n")),
        ))
    }
}

fn location_of(invocation: &Invocation) -> PathBuf {
    if invocation.subcommand() == Some("clone") {
        invocation.args().last().map(PathBuf::from).unwrap_or_default()
    } else {
        invocation.cwd().map(Path::to_path_buf).unwrap_or_default()
    }
}

fn read_packed_refs(mirror: &Path) -> Result<BTreeMap<String, String>, String> {
    let content = std::fs::read_to_string(mirror.join("packed-refs")).map_err(|e| e.to_string())?;
    content
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.split_once(' ')
                .map(|(oid, name)| (name.to_string(), oid.to_string()))
                .ok_or_else(|| format!("corrupt packed-refs line: {line}"))
        })
        .collect()
}

fn write_packed_refs(mirror: &Path, refs: &BTreeMap<String, String>) -> Result<(), String> {
    let content: String = refs.iter().map(|(name, oid)| format!("{oid} {name}\n")).collect();
    std::fs::write(mirror.join("packed-refs"), content).map_err(|e| e.to_string())
}

fn for_each_ref(mirror: &Path) -> Result<InvocationOutput, String> {
    let refs = read_packed_refs(mirror)?;
    Ok(InvocationOutput::success(
        refs.iter().map(|(name, oid)| format!("{oid} {name}\n")).collect::<String>(),
    ))
}

fn update_ref(mirror: &Path, refname: &str, oid: &str) -> Result<InvocationOutput, String> {
    let mut refs = read_packed_refs(mirror)?;
    refs.insert(refname.to_string(), oid.to_string());
    write_packed_refs(mirror, &refs)?;
    Ok(InvocationOutput::success(""))
}

impl CommandInvoker for FakeGit {
    fn invoke<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> BoxFuture<'a, MirrorResult<InvocationOutput>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(invocation.clone());
            let location = location_of(invocation);
            let _busy = self.enter(location.clone());

            match self.delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => tokio::task::yield_now().await,
            }

            match self.failure_for(invocation, &location) {
                Some(Failure::Exit(code)) => {
                    return Ok(InvocationOutput::failure(code, "fatal: injected failure"));
                }
                Some(Failure::CorruptThenExit) => {
                    let _ = std::fs::write(location.join("packed-refs"), "corrupted");
                    return Ok(InvocationOutput::failure(1, "fatal: injected failure"));
                }
                Some(Failure::ClobberThenExit) => {
                    let _ = std::fs::remove_dir_all(&location);
                    let _ = std::fs::write(&location, "clobbered");
                    return Ok(InvocationOutput::failure(1, "fatal: injected failure"));
                }
                Some(Failure::Timeout) => {
                    return Err(ProcessError::Timeout {
                        command: invocation.to_string(),
                        timeout_secs: 1,
                    }
                    .into());
                }
                Some(Failure::Panic) => panic!("injected panic in {invocation}"),
                None => {}
            }

            Ok(self.execute(invocation, &location))
        })
    }
}
