use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::warn;

use warren_dispatch::dispatch;
use warren_proto::Request;
use warren_router::Router;

/// Reads `<source> <target> <method> [parameters-json]` lines from stdin
/// and dispatches each through the router, printing the response. A
/// smoke-test convenience, not a reimplementation of the out-of-scope TCP
/// front end.
pub async fn run(router: Arc<Router>) -> io::Result<()> {
    let next_id = AtomicU64::new(1);
    let stdin = io::stdin();
    prompt();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            prompt();
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let mut parts = line.splitn(4, ' ');
        let (Some(source), Some(target), Some(method)) = (parts.next(), parts.next(), parts.next()) else {
            println!("usage: <source> <target> <method> [parameters-json]");
            prompt();
            continue;
        };
        let parameters = parts.next().unwrap_or("[]");
        let id = next_id.fetch_add(1, Ordering::SeqCst).to_string();

        match router.resolve(source, target).await {
            Ok(handlers) => {
                let request = Request::new(id, source, target, method).with_parameters(parameters);
                let response = dispatch(&handlers, request).await;
                match response.header.error {
                    Some(err) => println!("error: {err}"),
                    None => println!("{}", response.result),
                }
            }
            Err(err) => {
                warn!(%source, %target, "resolve failed: {err}");
                println!("error: {err}");
            }
        }
        prompt();
    }
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}
