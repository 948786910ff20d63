//! Scripted scenario for `--demo`: a request, a safe landing next to a
//! flooded block, a cancelled countdown and a home teleport.

use crate::app::Application;
use crate::error::AppError;
use crate::world::BlockKind;
use tokio::time::{sleep, Duration, Instant};
use tracing::info;
use yatpa_core::{ActorDirectory, ActorId, EnqueueOutcome, LandingMode, Position, RequestKind, WorldAdapter};

pub async fn run(app: &Application) -> Result<(), AppError> {
    let world = app.world();
    let service = app.service();
    let realm = world.realm();
    let feet_y = f64::from(app.config().world.ground_height + 1);
    let spawn = world.spawn_point(&realm);

    let alice = world.join("Alice", Position::new(realm.clone(), spawn.x, feet_y, spawn.z));
    let bob = world.join("Bob", Position::new(realm.clone(), spawn.x + 40.0, feet_y, spawn.z - 20.0));

    let costs = &app.config().teleport.costs;
    world.give_levels(alice, 200);
    world.give_items(alice, &costs.item, 200);

    // Bob stands over water, so Alice has to land beside him.
    let bob_block = Position::new(realm.clone(), spawn.x + 40.0, feet_y, spawn.z - 20.0).block();
    world.set_block(&realm, bob_block.x, bob_block.y - 1, bob_block.z, BlockKind::Liquid);

    info!("🎬 Demo 1/3: Alice asks to teleport to Bob");
    let target = service.find_actor(alice, "bob")?;
    service.send_request(alice, target, RequestKind::Tpa)?;
    let outcome = service.accept(bob)?;
    settle(app, alice, outcome).await?;

    let landed = world
        .position(alice)
        .ok_or_else(|| AppError::Demo("Alice went offline".to_string()))?;
    let block = landed.block();
    if !world.is_solid_and_dry(&realm, block.x, block.y - 1, block.z) || block == bob_block {
        return Err(AppError::Demo(format!("Alice landed somewhere unsafe: {landed}")));
    }
    info!("🛟 Alice landed at {} next to Bob's flooded block {}", landed, bob_block);

    info!("🎬 Demo 2/3: Alice sets a home, starts a spawn teleport and walks away");
    service.set_home(alice, "lookout")?;
    if let EnqueueOutcome::Armed { .. } = service.spawn_teleport(alice)? {
        let walked = Position::new(realm.clone(), landed.x + 2.0, landed.y, landed.z);
        world.walk(alice, walked.clone());
        // The tick loop may notice the move first.
        if !service.on_move(alice, &walked) && service.scheduler().is_pending(alice) {
            return Err(AppError::Demo("walking did not cancel the countdown".to_string()));
        }
    }

    info!("🎬 Demo 3/3: Alice goes home");
    let outcome = service.home_teleport(alice, None)?;
    settle(app, alice, outcome).await?;
    let home = world
        .position(alice)
        .ok_or_else(|| AppError::Demo("Alice went offline".to_string()))?;
    let exact = app.config().teleport.landing.mode == LandingMode::Exact;
    if exact && home.block() != block {
        return Err(AppError::Demo(format!("Alice did not arrive home: {home}")));
    }

    let left_at = app.disconnect(bob);
    info!("👋 Bob logged off at {:?}", left_at.map(|p| p.to_string()));

    info!("📜 Alice's messages:");
    for line in app.notifier().history(alice) {
        info!("  {}", line);
    }
    info!("🎉 Demo complete");
    Ok(())
}

/// Waits for `actor`'s countdown to finish, if one was armed.
async fn settle(app: &Application, actor: ActorId, outcome: EnqueueOutcome) -> Result<(), AppError> {
    let EnqueueOutcome::Armed { ticks } = outcome else {
        return Ok(());
    };

    let settings = &app.config().teleport;
    let tick_ms = app.config().server.tick_interval_ms.max(1);
    info!("⏳ Countdown armed: {} ticks ({}s)", ticks, settings.teleport_delay_seconds);

    let deadline = Instant::now() + Duration::from_millis(tick_ms * u64::from(ticks)) + Duration::from_secs(5);
    while app.service().scheduler().is_pending(actor) {
        if Instant::now() >= deadline {
            return Err(AppError::Demo("teleport did not complete in time".to_string()));
        }
        sleep(Duration::from_millis(tick_ms)).await;
    }
    Ok(())
}
