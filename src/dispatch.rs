//! Dispatch phase: scan output folders and email each recipient
//!
//! The render and dispatch phases share nothing but the filesystem: a
//! recipient folder containing both the plain-text body and the certificate
//! image is sendable, anything else is silently skipped. Sends run on a
//! fixed-width pool of blocking worker threads; each worker opens its own
//! mail session because the underlying protocol session is not safe for
//! concurrent use, and one task's failure never aborts its siblings.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use log::debug;

use crate::batch::{BODY_HTML_FILE, BODY_TEXT_FILE, CERT_IMAGE_FILE};
use crate::mail::Mailer;
use crate::Result;

/// One message ready to send, read back from a recipient folder.
#[derive(Debug, Clone)]
pub struct Outgoing {
    /// Recipient address (the folder name)
    pub recipient: String,
    /// Plain-text body from `email.txt`
    pub body_text: String,
    /// HTML body from `email.html`, when present
    pub body_html: Option<String>,
    /// Certificate image plus any fixed extra attachments
    pub attachments: Vec<PathBuf>,
}

/// Collect every sendable recipient folder under `out_root`.
///
/// A folder missing either the body or the image is skipped without error.
/// Files from `extras_dir`, if given, are attached to every message.
pub fn collect_outgoing(out_root: &Path, extras_dir: Option<&Path>) -> Result<Vec<Outgoing>> {
    let mut extras = Vec::new();
    if let Some(dir) = extras_dir {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                extras.push(entry.path());
            }
        }
        extras.sort();
    }

    let mut outgoing = Vec::new();
    for entry in fs::read_dir(out_root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let dir = entry.path();
        let body_path = dir.join(BODY_TEXT_FILE);
        let image_path = dir.join(CERT_IMAGE_FILE);
        if !body_path.exists() || !image_path.exists() {
            debug!("skipping incomplete folder {}", dir.display());
            continue;
        }

        let recipient = entry.file_name().to_string_lossy().into_owned();
        let body_text = fs::read_to_string(&body_path)?;
        let body_html = fs::read_to_string(dir.join(BODY_HTML_FILE)).ok();

        let mut attachments = vec![image_path];
        attachments.extend(extras.iter().cloned());

        outgoing.push(Outgoing {
            recipient,
            body_text,
            body_html,
            attachments,
        });
    }

    outgoing.sort_by(|a, b| a.recipient.cmp(&b.recipient));
    Ok(outgoing)
}

/// Send every message on a pool of `workers` blocking threads.
///
/// `connect` opens a fresh mail session and is called per worker, lazily, so
/// a relay that refuses one connection fails only the jobs that worker
/// picks up. Returns one `(recipient, result)` entry per input message, in
/// completion order.
pub fn dispatch<M, F>(
    outgoing: Vec<Outgoing>,
    workers: usize,
    connect: F,
) -> Vec<(String, Result<()>)>
where
    M: Mailer,
    F: Fn() -> Result<M> + Sync,
{
    let workers = workers.max(1);
    let (job_tx, job_rx) = mpsc::channel::<Outgoing>();
    for job in outgoing {
        // The receiver outlives this loop, so send cannot fail.
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    let job_rx = Arc::new(Mutex::new(job_rx));
    let (result_tx, result_rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            let connect = &connect;
            scope.spawn(move || {
                let mut mailer: Option<M> = None;
                loop {
                    // All jobs were queued up front, so recv never blocks
                    // while the lock is held.
                    let job = {
                        let queue = match job_rx.lock() {
                            Ok(queue) => queue,
                            Err(_) => break,
                        };
                        queue.recv()
                    };
                    let job = match job {
                        Ok(job) => job,
                        Err(_) => break,
                    };
                    let result = match mailer.as_mut() {
                        Some(m) => m.send(&job),
                        None => match connect() {
                            Ok(mut m) => {
                                let r = m.send(&job);
                                mailer = Some(m);
                                r
                            }
                            Err(e) => Err(e),
                        },
                    };
                    let _ = result_tx.send((job.recipient, result));
                }
            });
        }
        drop(result_tx);
    });

    result_rx.into_iter().collect()
}
