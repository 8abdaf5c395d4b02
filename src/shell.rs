use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::application::{App, Severity};
use crate::command::{self, HELP, Input};
use crate::message::{Effect, Message};
use docket::core::resource::ResourceRegistry;
use docket::metadata::TitleFetcher;
use docket::storage::KeyValueStore;

type Inflight = FuturesUnordered<BoxFuture<'static, Message>>;

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Apply a message and start whatever lookups it asks for.
fn dispatch<K, R, F>(app: &mut App<K, R>, fetcher: &F, inflight: &mut Inflight, message: Message)
where
    K: KeyValueStore,
    R: ResourceRegistry,
    F: TitleFetcher + Clone + Send + Sync + 'static,
{
    for effect in app.update(message) {
        match effect {
            Effect::ResolveTitle(request) => {
                let fetcher = fetcher.clone();
                inflight.push(
                    async move {
                        let result = fetcher.resolve_title(&request.url).await;
                        Message::TitleResolved(request, result)
                    }
                    .boxed(),
                );
            }
        }
    }
}

fn print_notifications<K, R, W>(app: &mut App<K, R>, output: &mut W) -> io::Result<()>
where
    K: KeyValueStore,
    R: ResourceRegistry,
    W: Write,
{
    for note in app.take_notifications() {
        let prefix = match note.severity {
            Severity::Success => "ok",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        writeln!(output, "{}: {}", prefix, note.message)?;
    }
    Ok(())
}

/// Run the command loop until `quit`, end of input or `interrupt` resolves,
/// then wait for the title lookups still in flight so no accepted task is lost.
pub async fn run_with<K, R, F, I, W, S>(
    mut app: App<K, R>,
    fetcher: F,
    input: I,
    mut output: W,
    interrupt: S,
) -> io::Result<App<K, R>>
where
    K: KeyValueStore,
    R: ResourceRegistry,
    F: TitleFetcher + Clone + Send + Sync + 'static,
    I: AsyncBufRead + Unpin,
    W: Write,
    S: Future<Output = io::Result<()>>,
{
    let mut lines = input.lines();
    let mut inflight: Inflight = FuturesUnordered::new();

    tokio::pin!(interrupt);
    let mut interruptible = true;

    print_notifications(&mut app, &mut output)?;
    writeln!(output, "{}", app.view(today()))?;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    writeln!(output)?;
                    break;
                };
                match command::parse(&line, today()) {
                    Ok(Input::Empty) => {}
                    Ok(Input::List) => writeln!(output, "{}", app.view(today()))?,
                    Ok(Input::Help) => writeln!(output, "{}", HELP)?,
                    Ok(Input::Quit) => break,
                    Ok(Input::Command(cmd)) => match app.message_for(cmd) {
                        Ok(message) => {
                            dispatch(&mut app, &fetcher, &mut inflight, message);
                            print_notifications(&mut app, &mut output)?;
                            writeln!(output, "{}", app.view(today()))?;
                        }
                        Err(e) => writeln!(output, "error: {}", e)?,
                    },
                    Err(e) => writeln!(output, "error: {}", e)?,
                }
            }
            Some(message) = inflight.next(), if !inflight.is_empty() => {
                writeln!(output)?;
                dispatch(&mut app, &fetcher, &mut inflight, message);
                print_notifications(&mut app, &mut output)?;
            }
            signal = &mut interrupt, if interruptible => match signal {
                Ok(()) => {
                    log::info!("Interrupted, shutting down");
                    writeln!(output)?;
                    break;
                }
                Err(e) => {
                    log::warn!("Interrupt handler unavailable: {}", e);
                    interruptible = false;
                }
            },
        }
    }

    if !inflight.is_empty() {
        log::info!("Waiting for {} title lookups before exit", inflight.len());
        writeln!(output, "Waiting for {} title lookups...", inflight.len())?;
    }
    while let Some(message) = inflight.next().await {
        dispatch(&mut app, &fetcher, &mut inflight, message);
        print_notifications(&mut app, &mut output)?;
    }

    Ok(app)
}

/// Interactive session on stdin/stdout; Ctrl-C ends it like `quit`.
pub async fn run<K, R, F>(app: App<K, R>, fetcher: F) -> io::Result<App<K, R>>
where
    K: KeyValueStore,
    R: ResourceRegistry,
    F: TitleFetcher + Clone + Send + Sync + 'static,
{
    let stdin = BufReader::new(tokio::io::stdin());
    run_with(app, fetcher, stdin, io::stdout(), tokio::signal::ctrl_c()).await
}
