//! E2E test: a robot trades a replayed series on the virtual account.
//!
//! Flow:
//! 1. Falling closes drive RSI(3) to 0 -> robot opens LONG at 97
//! 2. One up bar keeps the long vote ahead -> position held
//! 3. Second up bar flips the vote to SHORT -> position closed at 99
//! 4. Account balance = initial + realized P&L

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shadow_domain::{Bar, PositionType, TimeUnit, Timeframe};
use shadow_engine::explorer::RsiExplorerConfig;
use shadow_engine::{ExplorerConfig, SeverityMultipliers};
use shadow_exec::{millis_to_datetime, FixedClock};
use shadow_sim::{PriceFeed, ReplayBarSource, SimulatedGateway, VirtualAccount};
use shadowd::{
    Config, CycleOutcome, Daemon, OrderConfig, Robot, RobotConfig, RobotFactory, RobotSettings,
    SinglePositionRobot,
};

const CLOSES: [i64; 6] = [100, 99, 98, 97, 98, 99];

fn rsi_robot_config(historical_data_file: Option<String>) -> RobotConfig {
    RobotConfig {
        symbol: "BTCUSDT".to_string(),
        timeframe: Timeframe::new(TimeUnit::Second, 1).unwrap(),
        order: OrderConfig {
            percentage_from_deposit: dec!(10),
            futures_multiplier: 1,
            stop_loss_pct: dec!(0.02),
        },
        historical_data_file,
        multipliers: SeverityMultipliers::default(),
        explorers: vec![ExplorerConfig::Rsi(RsiExplorerConfig {
            period: 3,
            ..RsiExplorerConfig::default()
        })],
        blockers: vec![],
    }
}

fn replay_bars() -> Vec<Bar> {
    CLOSES
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let close = Decimal::from(*c);
            let time = millis_to_datetime(1_000 * i as i64);
            Bar::new(time, close, close, close, close, dec!(1)).unwrap()
        })
        .collect()
}

// =============================================================================
// Test: robot cycle by cycle
// =============================================================================

#[tokio::test]
async fn test_replay_open_hold_close() {
    let account = Arc::new(VirtualAccount::new(dec!(1000)));
    let source = Arc::new(ReplayBarSource::from_bars("BTCUSDT", replay_bars()));
    let feed: Arc<dyn PriceFeed> = source.clone();
    let gateway = Arc::new(SimulatedGateway::new(Arc::clone(&account), feed));

    let config = rsi_robot_config(None);
    let strategy = RobotFactory::create_strategy(&config).unwrap();
    assert_eq!(strategy.required_period_threshold(), 4);

    let settings = RobotSettings {
        symbol: config.symbol.clone(),
        timeframe: config.timeframe,
        percentage_from_deposit: config.order.percentage_from_deposit,
        futures_multiplier: config.order.futures_multiplier,
    };
    let mut robot = SinglePositionRobot::new(
        settings,
        source.clone(),
        gateway,
        strategy,
        Arc::new(FixedClock::at_millis(10_000)),
    );

    // init releases the first bar
    robot.init().await.unwrap();
    assert_eq!(robot.bar_count(), 1);

    assert_eq!(
        robot.run_cycle().await.unwrap(),
        CycleOutcome::Skipped { held: 2, required: 4 }
    );
    assert_eq!(
        robot.run_cycle().await.unwrap(),
        CycleOutcome::Skipped { held: 3, required: 4 }
    );

    // RSI([100, 99, 98, 97]) = 0
    assert_eq!(robot.run_cycle().await.unwrap(), CycleOutcome::Opened(PositionType::Long));
    let position = robot.positions().pop().unwrap();
    assert_eq!(position.entry, dec!(97));
    assert_eq!(position.stop_loss, Some(dec!(95.06)));
    assert_eq!(account.balance(), dec!(900));

    // RSI([99, 98, 97, 98]) ~ 33: long MEDIUM, short NOT_READY
    assert_eq!(robot.run_cycle().await.unwrap(), CycleOutcome::Holding);

    // RSI([98, 97, 98, 99]) ~ 67: short MEDIUM outvotes long
    assert_eq!(robot.run_cycle().await.unwrap(), CycleOutcome::Closed(PositionType::Long));
    assert!(robot.positions().is_empty());
    assert_eq!(source.current_price(), Some(dec!(99)));

    let closed = account.closed_orders();
    assert_eq!(closed.len(), 1);
    let pnl = closed[0].pnl_at(dec!(99));
    assert!(pnl > Decimal::ZERO);
    assert_eq!(account.balance(), dec!(1000) + pnl);
    assert!(account.open_orders().is_empty());
}

// =============================================================================
// Test: whole daemon on a paused clock
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_daemon_replays_file_and_shuts_down() {
    let path = std::env::temp_dir().join(format!("shadowd-e2e-{}.json", std::process::id()));
    let candles: Vec<String> = CLOSES
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                r#"{{"timestamp": {}, "open": "{c}", "high": "{c}", "low": "{c}", "close": "{c}", "volume": "1"}}"#,
                1_000 * i,
                c = c
            )
        })
        .collect();
    std::fs::write(&path, format!("[{}]", candles.join(","))).unwrap();

    let config = Config {
        virtual_balance: dec!(1000),
        robots: vec![rsi_robot_config(Some(path.to_string_lossy().into_owned()))],
        ..Config::test()
    };

    let mut daemon = Daemon::with_clock(config, Arc::new(FixedClock::at_millis(5_500))).unwrap();
    assert_eq!(daemon.manager().len(), 1);

    daemon.start();
    // ticks at 0.5s, 1.5s, ... release bars 2..6; the fifth closes the position
    tokio::time::sleep(Duration::from_millis(5_000)).await;
    daemon.shutdown().await;

    let account = daemon.account();
    assert_eq!(account.closed_orders().len(), 1);
    assert!(account.open_orders().is_empty());
    assert!(account.balance() > dec!(1000));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_daemon_rejects_invalid_config() {
    let mut robot = rsi_robot_config(None);
    robot.order.percentage_from_deposit = dec!(0);

    let config = Config {
        robots: vec![robot],
        ..Config::test()
    };
    assert!(Daemon::new(config).is_err());
}
