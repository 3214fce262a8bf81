//! Headless session client for the lofiboard relay.
//!
//! Hosts a full [`canvas::engine::EngineCore`] over a websocket: runs the
//! join sequence (announce, then request state), applies inbound room events
//! to the engine, arms the randomized bootstrap-reply timer the engine asks
//! for, and translates publish actions back into wire frames. `watch` keeps
//! the session open and prints room traffic; `draw` scripts one stroke
//! through the pointer state machine and exits.
//!
//! Render actions are ignored here — there is no pixel surface attached; a
//! graphical host would hand them to `canvas::render::Renderer`.

use std::time::Instant;

use canvas::engine::{Action, EngineCore, Identity};
use canvas::input::{ActiveTool, Button};
use clap::{Args, Parser, Subcommand};
use frames::{BrushSettings, Event, Point, Tool};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket send failed: {0}")]
    WsSend(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("frame encode failed: {0}")]
    Codec(#[from] frames::CodecError),
}

#[derive(Parser, Debug)]
#[command(name = "lofi", about = "Lofiboard headless session client")]
struct Cli {
    /// Relay base URL.
    #[arg(long, env = "LOFI_SERVER_URL", default_value = "ws://127.0.0.1:3000")]
    server_url: String,

    /// Room to join.
    #[arg(long, env = "LOFI_ROOM", default_value = "default-room")]
    room: String,

    /// Display name; a guest name is generated when omitted.
    #[arg(long)]
    name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Join a room and print its traffic until the connection closes.
    Watch,
    /// Draw one scripted stroke into the room, then exit.
    Draw(DrawArgs),
}

#[derive(Args, Debug)]
struct DrawArgs {
    /// Tool: pencil, eraser, rectangle, circle, triangle, arrow, line.
    #[arg(long, default_value = "pencil", value_parser = parse_tool)]
    tool: Tool,

    /// Stroke start, world coordinates, as `X,Y`.
    #[arg(long, value_parser = parse_point)]
    from: Point,

    /// Stroke end, world coordinates, as `X,Y`.
    #[arg(long, value_parser = parse_point)]
    to: Point,

    /// Stroke color (`#rrggbb`).
    #[arg(long, default_value = "#ff6b6b")]
    color: String,

    /// Stroke width in world units.
    #[arg(long, default_value_t = 4.0)]
    size: f64,

    /// Stroke opacity, 0..=1.
    #[arg(long, default_value_t = 1.0)]
    opacity: f64,

    /// Freehand sample count between start and end.
    #[arg(long, default_value_t = 16)]
    samples: u32,
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("invalid point `{value}`; expected X,Y"))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("invalid X in `{value}`"))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("invalid Y in `{value}`"))?;
    Ok(Point::new(x, y))
}

fn parse_tool(value: &str) -> Result<Tool, String> {
    match value {
        "pencil" => Ok(Tool::Pencil),
        "eraser" => Ok(Tool::Eraser),
        "rectangle" => Ok(Tool::Rectangle),
        "circle" => Ok(Tool::Circle),
        "triangle" => Ok(Tool::Triangle),
        "arrow" => Ok(Tool::Arrow),
        "line" => Ok(Tool::Line),
        other => Err(format!("unknown tool `{other}`")),
    }
}

/// Generate a guest identity the way the browser client does: short random
/// id, random cursor color.
fn guest_identity(name: Option<String>) -> Identity {
    let mut rng = rand::rng();
    let id: String = (0..7)
        .map(|_| {
            let n = rng.random_range(0..36u32);
            char::from_digit(n, 36).unwrap_or('x')
        })
        .collect();
    let color = format!("#{:06x}", rng.random_range(0..0x00ff_ffffu32));
    Identity {
        name: name.unwrap_or_else(|| format!("guest-{id}")),
        id,
        color,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let url = format!("{}/ws?room={}", cli.server_url.trim_end_matches('/'), cli.room);
    let (socket, _) = connect_async(&url)
        .await
        .map_err(|e| CliError::WsConnect(Box::new(e)))?;
    let (mut sink, stream) = socket.split();

    let mut engine = EngineCore::new(guest_identity(cli.name));
    engine.set_viewport(1280.0, 720.0, 1.0);
    println!("joined {} as {}", cli.room, engine.identity().id);

    let mut session = Session { sink: &mut sink, reply_at: None };
    let actions = engine.channel_subscribed();
    session.execute(&engine, actions).await?;

    match cli.command {
        Command::Watch => watch(&mut engine, &mut session, stream).await,
        Command::Draw(args) => {
            let tool = args.tool;
            let actions = scripted_stroke(&mut engine, &args);
            session.execute(&engine, actions).await?;
            println!("committed {tool:?} stroke; canvas holds {} path(s)", engine.doc.len());
            Ok(())
        }
    }
}

/// Owns the outbound half of the connection plus the one-shot bootstrap
/// reply timer the engine may arm.
struct Session<'a> {
    sink: &'a mut WsSink,
    reply_at: Option<tokio::time::Instant>,
}

impl Session<'_> {
    /// Execute engine actions: translate publishes to wire frames and arm
    /// timers. Render actions are ignored (no surface attached).
    async fn execute(&mut self, engine: &EngineCore, actions: Vec<Action>) -> Result<(), CliError> {
        for action in actions {
            let member = engine.member();
            let event = match action {
                Action::PublishCommit(path) => {
                    Some(Event::Draw { path, sender_id: member.id })
                }
                Action::PublishProgress(path) => {
                    Some(Event::DrawProgress { path, sender_id: member.id })
                }
                Action::PublishCursor(at) => Some(Event::cursor(&member, at)),
                Action::PublishPresence(member) => Some(Event::PresenceAnnounce { member }),
                Action::PublishStateRequest => {
                    Some(Event::RequestState { sender_id: member.id })
                }
                Action::PublishStateReply(paths) => {
                    Some(Event::SyncState { paths, sender_id: member.id })
                }
                Action::ScheduleStateReply { delay_ms } => {
                    self.reply_at = Some(
                        tokio::time::Instant::now() + std::time::Duration::from_millis(delay_ms),
                    );
                    None
                }
                Action::RenderFull | Action::RenderSegment { .. } => None,
            };
            if let Some(event) = event {
                let text = frames::encode(&event)?;
                self.sink
                    .send(Message::Text(text.into()))
                    .await
                    .map_err(|e| CliError::WsSend(Box::new(e)))?;
            }
        }
        Ok(())
    }
}

/// Sleep until the optional deadline; pends forever when there is none.
async fn reply_timer(at: Option<tokio::time::Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

async fn watch(
    engine: &mut EngineCore,
    session: &mut Session<'_>,
    mut stream: WsStream,
) -> Result<(), CliError> {
    loop {
        tokio::select! {
            msg = stream.next() => {
                let Some(Ok(msg)) = msg else {
                    println!("connection closed");
                    return Ok(());
                };
                let Message::Text(text) = msg else { continue };
                let event = match frames::decode(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        eprintln!("dropping malformed frame: {e}");
                        continue;
                    }
                };
                describe(&event);
                let actions = engine.apply_event(event);
                session.execute(engine, actions).await?;
            }
            () = reply_timer(session.reply_at) => {
                session.reply_at = None;
                let actions = engine.state_reply();
                session.execute(engine, actions).await?;
            }
        }
    }
}

/// One line per interesting event; cursor chatter stays quiet.
fn describe(event: &Event) {
    match event {
        Event::Draw { path, sender_id } => {
            println!(
                "draw      {sender_id} tool={:?} points={}",
                path.tool,
                path.points.len(),
            );
        }
        Event::DrawProgress { sender_id, path } => {
            println!("progress  {sender_id} points={}", path.points.len());
        }
        Event::SyncState { paths, sender_id } => {
            println!("sync      {sender_id} offered {} path(s)", paths.len());
        }
        Event::RequestState { sender_id } => {
            println!("request   {sender_id} asked for the canvas");
        }
        Event::PresenceSync { members } => {
            println!("presence  {} member(s) in room", members.len());
        }
        Event::CursorMove { .. } | Event::PresenceAnnounce { .. } => {}
    }
}

/// Drive one stroke through the engine's pointer state machine, exactly as a
/// pointing device would, and collect every resulting action.
fn scripted_stroke(engine: &mut EngineCore, args: &DrawArgs) -> Vec<Action> {
    engine.set_brush(BrushSettings {
        color: args.color.clone(),
        size: args.size,
        opacity: args.opacity,
    });
    engine.set_tool(ActiveTool::Draw(args.tool));

    let started = Instant::now();
    let now_ms = |started: Instant| started.elapsed().as_secs_f64() * 1000.0;

    // The engine works in screen space; with an identity camera the scripted
    // world coordinates pass through unchanged.
    let mut actions = engine.on_pointer_down(args.from, Button::Primary);
    let steps = args.samples.max(1);
    for i in 1..=steps {
        let t = f64::from(i) / f64::from(steps);
        let at = Point::new(
            args.from.x + (args.to.x - args.from.x) * t,
            args.from.y + (args.to.y - args.from.y) * t,
        );
        // Offset the clock so every sample clears the publish throttle.
        actions.extend(engine.on_pointer_move(at, now_ms(started) + f64::from(i) * 20.0));
    }
    actions.extend(engine.on_pointer_up());
    actions
}
