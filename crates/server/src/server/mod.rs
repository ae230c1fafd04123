//! Room service and runtime.
//!
//! [`Rooms`] owns every room behind its own lock and is shared by the three
//! tick loops and the command loop. [`run`] wires them to the transport's
//! channels.

use crate::balance::balance;
use crate::config::Config;
use crate::entity::VirusStyle;
use crate::error::CoreError;
use crate::world::Room;
use protocol::{ClientEvent, Outbound, RoomCommand, RoomId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::info;

pub mod game;
pub mod scheduler;
mod session;

pub use game::TickKind;

/// Registry of live rooms.
pub struct Rooms {
    config: Arc<Config>,
    virus_style: VirusStyle,
    rooms: RwLock<HashMap<RoomId, Arc<Mutex<Room>>>>,
}

impl Rooms {
    pub fn new(config: Config) -> Result<Self, CoreError> {
        config.validate()?;
        let virus_style = config.virus.style()?;
        Ok(Self {
            config: Arc::new(config),
            virus_style,
            rooms: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<Room>>> {
        self.rooms.read().await.get(id).cloned()
    }

    /// Look up a room, creating and populating it on first use.
    pub async fn get_or_create(&self, id: &str) -> Arc<Mutex<Room>> {
        if let Some(room) = self.get(id).await {
            return room;
        }

        let mut rooms = self.rooms.write().await;
        rooms
            .entry(id.to_string())
            .or_insert_with(|| {
                let mut room = Room::new(id, &self.config, self.virus_style);
                balance(&mut room, &self.config);
                info!(
                    "Room '{}' created: {} food, {} viruses",
                    id,
                    room.food.len(),
                    room.viruses.len()
                );
                Arc::new(Mutex::new(room))
            })
            .clone()
    }

    /// Handles to every room, taken without holding the registry lock afterwards.
    pub async fn snapshot(&self) -> Vec<(RoomId, Arc<Mutex<Room>>)> {
        self.rooms
            .read()
            .await
            .iter()
            .map(|(id, room)| (id.clone(), Arc::clone(room)))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }

    /// Drop the room if no client is connected to it any more.
    pub async fn remove_if_empty(&self, id: &str) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get(id) else {
            return false;
        };
        let empty = room.lock().await.is_empty();
        if empty {
            rooms.remove(id);
            info!("Room '{}' removed", id);
        }
        empty
    }

    /// Lock a registered room.
    ///
    /// The registry read guard is held until the room lock is taken, so
    /// [`Rooms::remove_if_empty`] cannot drop the room in between.
    async fn lock_registered(&self, id: &str) -> Option<OwnedMutexGuard<Room>> {
        let rooms = self.rooms.read().await;
        let room = Arc::clone(rooms.get(id)?);
        Some(room.lock_owned().await)
    }

    /// Apply one inbound command to its room.
    pub async fn dispatch(&self, command: RoomCommand, now: Instant) -> Result<Vec<Outbound>, CoreError> {
        let RoomCommand { room: room_id, player, event } = command;
        let mut room = if matches!(event, ClientEvent::Join { .. }) {
            loop {
                if let Some(room) = self.lock_registered(&room_id).await {
                    break room;
                }
                // Not registered, or dropped before we got the lock.
                self.get_or_create(&room_id).await;
            }
        } else {
            self.lock_registered(&room_id)
                .await
                .ok_or_else(|| CoreError::UnknownRoom(room_id.clone()))?
        };

        let disconnect = matches!(event, ClientEvent::Disconnect);
        let events = room.handle_event(player, event, &self.config, now)?;
        drop(room);
        if disconnect {
            self.remove_if_empty(&room_id).await;
        }
        Ok(events)
    }
}

/// Run the simulation core until the command channel closes.
pub async fn run(
    config: Config,
    commands: UnboundedReceiver<RoomCommand>,
    outbound: UnboundedSender<Outbound>,
) -> anyhow::Result<()> {
    let rooms = Arc::new(Rooms::new(config)?);
    let server = &rooms.config().server;
    info!(
        "Simulation core running: movement {} Hz, rules {} Hz, publish {} Hz",
        server.movement_hz, server.rules_hz, server.publish_hz
    );

    let tickers: Vec<_> = TickKind::ALL
        .into_iter()
        .map(|kind| {
            tokio::spawn(scheduler::run_tick_loop(
                Arc::clone(&rooms),
                kind,
                outbound.clone(),
            ))
        })
        .collect();

    scheduler::run_command_loop(Arc::clone(&rooms), commands, outbound).await;

    for ticker in tickers {
        ticker.abort();
    }
    info!("Simulation core stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{Role, ServerEvent, Target};
    use tokio::sync::mpsc;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.food.uniform = false;
        config.food.max_amount = 50;
        config
    }

    fn join(room: &str, player: u32) -> RoomCommand {
        RoomCommand::new(
            room,
            player,
            ClientEvent::Join {
                name: format!("p{player}"),
                role: Role::Player,
            },
        )
    }

    #[tokio::test]
    async fn test_join_creates_populated_room() {
        let rooms = Rooms::new(test_config()).unwrap();
        let events = rooms.dispatch(join("a", 1), Instant::now()).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(rooms.len().await, 1);

        let room = rooms.get("a").await.unwrap();
        let room = room.lock().await;
        assert_eq!(room.food.len(), 50);
        assert_eq!(room.players.len(), 1);
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let rooms = Rooms::new(test_config()).unwrap();
        rooms.dispatch(join("a", 1), Instant::now()).await.unwrap();
        rooms.dispatch(join("b", 1), Instant::now()).await.unwrap();
        assert_eq!(rooms.len().await, 2);

        let events = rooms
            .dispatch(RoomCommand::new("a", 1, ClientEvent::Disconnect), Instant::now())
            .await
            .unwrap();
        assert_eq!(events[0].room, "a");
        assert_eq!(rooms.len().await, 1);
        assert!(rooms.get("b").await.is_some());
    }

    #[tokio::test]
    async fn test_join_after_removal_recreates_room() {
        let rooms = Rooms::new(test_config()).unwrap();
        let stale = rooms.get_or_create("a").await;
        assert!(rooms.remove_if_empty("a").await);

        let events = rooms.dispatch(join("a", 1), Instant::now()).await.unwrap();
        assert_eq!(events.len(), 2);
        let room = rooms.get("a").await.unwrap();
        assert!(!Arc::ptr_eq(&room, &stale));
        assert_eq!(room.lock().await.players.len(), 1);
        assert!(stale.lock().await.players.is_empty());
    }

    #[tokio::test]
    async fn test_join_waiting_on_room_keeps_it_registered() {
        let rooms = Arc::new(Rooms::new(test_config()).unwrap());
        let handle = rooms.get_or_create("a").await;
        // A tick holds the empty room while the join arrives.
        let ticking = handle.lock().await;

        let pending = {
            let rooms = Arc::clone(&rooms);
            tokio::spawn(async move { rooms.dispatch(join("a", 1), Instant::now()).await })
        };
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        // The rules loop cannot take the registry to drop the room meanwhile.
        assert!(rooms.rooms.try_write().is_err());

        drop(ticking);
        let events = pending.await.unwrap().unwrap();
        assert_eq!(events.len(), 2);
        assert!(!rooms.remove_if_empty("a").await);

        let room = rooms.get("a").await.unwrap();
        assert!(Arc::ptr_eq(&room, &handle));
        assert_eq!(room.lock().await.players.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_room_is_rejected() {
        let rooms = Rooms::new(test_config()).unwrap();
        let err = rooms
            .dispatch(RoomCommand::new("nowhere", 1, ClientEvent::Heartbeat), Instant::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownRoom(room) if room == "nowhere"));
        assert!(rooms.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.world.width = 0.0;
        assert!(Rooms::new(config).is_err());
    }

    #[tokio::test]
    async fn test_run_publishes_snapshots() {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        let core = tokio::spawn(run(test_config(), command_rx, outbound_tx));

        command_tx.send(join("lobby", 7)).unwrap();
        let mut saw_setup = false;
        let mut saw_snapshot = false;
        while !(saw_setup && saw_snapshot) {
            let event = outbound_rx.recv().await.unwrap();
            match event.event {
                ServerEvent::InitialSetup { .. } => saw_setup = true,
                ServerEvent::WorldSnapshot(snapshot) => {
                    assert_eq!(event.target, Target::Player(7));
                    assert!(snapshot.cells.iter().any(|player| player.is_self));
                    saw_snapshot = true;
                }
                _ => {}
            }
        }

        drop(command_tx);
        core.await.unwrap().unwrap();
    }
}
