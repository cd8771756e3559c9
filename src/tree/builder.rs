// src/tree/builder.rs
// =============================================================================
// Mirrors a remote repository into a TreeNode.
//
// How it works:
// 1. Push the repository root ("" path) onto a stack of pending work
// 2. Pop the top item: list a directory, or download a file
// 3. A listing turns every "file" entry into a leaf waiting for its content
//    and every "dir" entry into a directory waiting to be listed; both are
//    pushed back in reverse, so the first entry is popped next
// 4. Repeat until the stack is empty
//
// The result is a depth-first pre-order walk: a file is downloaded as soon
// as its listing is seen, and a directory is fully expanded before its next
// sibling. With the default concurrency of 1 exactly one request is in
// flight at any time, each awaited before the next is issued.
//
// With a higher concurrency the top `concurrency` items are popped as one
// batch and fetched through `buffered`, which keeps results in request
// order. Children still appear in the order the API listed them.
//
// Rust concepts used:
// - An explicit Vec used as a stack instead of recursion
// - Owned work items moved into each future, so the build future is Send
//   and can be handed to tokio::spawn
// =============================================================================

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::github::{ContentsClient, EntryKind, FetchError, RemoteEntry, RepoId};

use super::node::TreeNode;

/// Fan-out and depth guards for one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum requests in flight. Values below 1 are treated as 1.
    pub concurrency: usize,
    /// Deepest directory level allowed below the root; `None` is unbounded.
    pub max_depth: Option<usize>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            max_depth: None,
        }
    }
}

// A node under construction
enum Slot {
    File { name: String, content: Option<String> },
    Dir { name: String, children: Vec<usize> },
}

// One pending request
enum Work {
    List { slot: usize, path: String, depth: usize },
    Download { slot: usize, url: String },
}

// What a request brought back, tagged with the slot it belongs to
enum Fetched {
    Listing {
        slot: usize,
        depth: usize,
        entries: Vec<RemoteEntry>,
    },
    Content {
        slot: usize,
        text: String,
    },
}

#[derive(Debug, Clone)]
pub struct TreeBuilder {
    client: ContentsClient,
    options: BuildOptions,
}

impl TreeBuilder {
    pub fn new(client: ContentsClient, options: BuildOptions) -> Self {
        Self { client, options }
    }

    // Builds the tree for `id`. The root is named after the repository and is
    // always a directory, even for an empty repository.
    //
    // Parameters:
    //   id - owner and repository name
    //
    // Returns:
    //   The assembled tree, or the first error hit. There is no partial tree
    //   and no retry.
    pub async fn build(&self, id: &RepoId) -> Result<TreeNode, FetchError> {
        let concurrency = self.options.concurrency.max(1);
        info!(repo = %id, concurrency, "building repository tree");

        let mut arena = vec![Slot::Dir {
            name: id.repo.clone(),
            children: Vec::new(),
        }];
        let mut stack = vec![Work::List {
            slot: 0,
            path: String::new(),
            depth: 0,
        }];
        let mut listings = 0usize;
        let mut downloads = 0usize;

        while !stack.is_empty() {
            let split = stack.len() - concurrency.min(stack.len());
            // Top of the stack first
            let batch: Vec<Work> = stack.drain(split..).rev().collect();

            let client = self.client.clone();
            let repo = id.clone();
            let results: Vec<Fetched> = stream::iter(batch)
                .map(move |work| {
                    let client = client.clone();
                    let repo = repo.clone();
                    async move {
                        match work {
                            Work::List { slot, path, depth } => {
                                let entries = client.list_dir(&repo, &path).await?;
                                Ok::<_, FetchError>(Fetched::Listing {
                                    slot,
                                    depth,
                                    entries,
                                })
                            }
                            Work::Download { slot, url } => {
                                let text = client.fetch_raw(&url).await?;
                                Ok(Fetched::Content { slot, text })
                            }
                        }
                    }
                })
                .buffered(concurrency)
                .try_collect()
                .await?;

            // The first item of the batch must end up on top again, so its
            // children are pushed last
            for fetched in results.into_iter().rev() {
                match fetched {
                    Fetched::Listing {
                        slot,
                        depth,
                        entries,
                    } => {
                        listings += 1;
                        let children = self.expand(&mut arena, slot, depth, entries)?;
                        stack.extend(children.into_iter().rev());
                    }
                    Fetched::Content { slot, text } => {
                        downloads += 1;
                        if let Slot::File { content, .. } = &mut arena[slot] {
                            *content = Some(text);
                        }
                    }
                }
            }
        }

        info!(repo = %id, listings, downloads, "repository tree built");
        Ok(assemble(arena))
    }

    // Adds the entries of one listing under `parent` and returns the work
    // they need, in listing order.
    fn expand(
        &self,
        arena: &mut Vec<Slot>,
        parent: usize,
        depth: usize,
        entries: Vec<RemoteEntry>,
    ) -> Result<Vec<Work>, FetchError> {
        let mut work = Vec::with_capacity(entries.len());

        for entry in entries {
            let slot = arena.len();
            match entry.kind {
                EntryKind::File => {
                    let url = entry
                        .download_url
                        .ok_or_else(|| FetchError::MissingDownloadUrl {
                            path: entry.path.clone(),
                        })?;
                    arena.push(Slot::File {
                        name: entry.name,
                        content: None,
                    });
                    work.push(Work::Download { slot, url });
                }
                EntryKind::Dir => {
                    let depth = depth + 1;
                    if let Some(limit) = self.options.max_depth {
                        if depth > limit {
                            return Err(FetchError::DepthLimitExceeded {
                                path: entry.path,
                                limit,
                            });
                        }
                    }
                    arena.push(Slot::Dir {
                        name: entry.name,
                        children: Vec::new(),
                    });
                    work.push(Work::List {
                        slot,
                        path: entry.path,
                        depth,
                    });
                }
                EntryKind::Other => {
                    debug!(path = %entry.path, "skipping entry that is neither file nor directory");
                    continue;
                }
            }

            if let Slot::Dir { children, .. } = &mut arena[parent] {
                children.push(slot);
            }
        }

        Ok(work)
    }
}

// Children are always pushed after their parent, so walking the arena
// backwards finishes every child before its parent needs it.
fn assemble(arena: Vec<Slot>) -> TreeNode {
    let mut built: Vec<Option<TreeNode>> = Vec::with_capacity(arena.len());
    built.resize_with(arena.len(), || None);

    for (index, slot) in arena.into_iter().enumerate().rev() {
        let node = match slot {
            Slot::File { name, content } => TreeNode::file(name, content.unwrap_or_default()),
            Slot::Dir { name, children } => {
                let children = children
                    .into_iter()
                    .filter_map(|child| built[child].take())
                    .collect();
                TreeNode::dir(name, children)
            }
        };
        built[index] = Some(node);
    }

    built
        .into_iter()
        .next()
        .flatten()
        .unwrap_or_else(|| TreeNode::dir(String::new(), Vec::new()))
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Stack order
//    - Children are pushed in reverse so the first listed entry is popped next
//    - Depth is bounded by `max_depth` only, never by the call stack
//
// 2. buffered vs buffer_unordered
//    - buffer_unordered yields results as they complete
//    - buffered yields them in the order the futures were created
//
// 3. Client clones
//    - ContentsClient wraps a reqwest::Client, a reference-counted handle;
//      every clone shares one connection pool
// -----------------------------------------------------------------------------
