//! Fixed-rate tick loops and the inbound command loop.

use super::game::TickKind;
use super::Rooms;
use protocol::{Outbound, RoomCommand};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

/// Drive one kind of tick over every room until the outbound channel closes.
///
/// A tick body is awaited before the next tick fires, so a loop never
/// overlaps itself.
pub async fn run_tick_loop(rooms: Arc<Rooms>, kind: TickKind, outbound: UnboundedSender<Outbound>) {
    let period = kind.period(&rooms.config().server);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let budget = period.mul_f64(0.9);

    loop {
        ticker.tick().await;

        for (room_id, room) in rooms.snapshot().await {
            // Lock held for the whole tick; released before sending.
            let (events, empty) = {
                let mut room = room.lock().await;
                let started = std::time::Instant::now();
                let result = catch_unwind(AssertUnwindSafe(|| {
                    room.run_tick(kind, rooms.config(), started)
                }));

                let elapsed = started.elapsed();
                if elapsed > budget {
                    warn!(
                        "Slow {} tick in room '{}': {:.3}ms (budget: {:.1}ms) - {} players, {} food",
                        kind,
                        room_id,
                        elapsed.as_secs_f64() * 1000.0,
                        budget.as_secs_f64() * 1000.0,
                        room.players.len(),
                        room.food.len()
                    );
                }

                let events = result.unwrap_or_else(|_| {
                    error!("{} tick panicked in room '{}'", kind, room_id);
                    Vec::new()
                });
                (events, room.is_empty())
            };

            for event in events {
                if outbound.send(event).is_err() {
                    info!("Outbound channel closed, stopping {} loop", kind);
                    return;
                }
            }

            if kind == TickKind::Rules && empty {
                rooms.remove_if_empty(&room_id).await;
            }
        }
    }
}

/// Apply inbound events until the command channel closes.
pub async fn run_command_loop(
    rooms: Arc<Rooms>,
    mut commands: UnboundedReceiver<RoomCommand>,
    outbound: UnboundedSender<Outbound>,
) {
    while let Some(command) = commands.recv().await {
        let room_id = command.room.clone();
        let player_id = command.player;

        match rooms.dispatch(command, std::time::Instant::now()).await {
            Ok(events) => {
                for event in events {
                    if outbound.send(event).is_err() {
                        info!("Outbound channel closed, stopping command loop");
                        return;
                    }
                }
            }
            Err(e) => {
                warn!("Rejected event from player {} in room '{}': {}", player_id, room_id, e);
            }
        }
    }
    info!("Command channel closed");
}
