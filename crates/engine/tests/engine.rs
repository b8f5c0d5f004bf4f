// In crates/engine/tests/engine.rs

use anyhow::{Result, anyhow};
use api_client::Holding;
use async_trait::async_trait;
use core_types::{Kline, Side, Symbol};
use engine::{AccountSource, Engine, EngineConfig, MarketData, OrderOutcome, Services};
use execution::DryRunExecutor;
use notifier::MemoryNotifier;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
struct Market {
    price: Option<f64>,
    closes: Vec<f64>,
    day_high: f64,
    day_low: f64,
}

#[derive(Default)]
struct FakeExchange {
    markets: HashMap<String, Market>,
    holdings: Vec<Holding>,
}

fn dec(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap()
}

fn kline(i: usize, high: f64, low: f64, close: f64) -> Kline {
    Kline {
        open_time: i as i64 * 60_000,
        open: dec(close),
        high: dec(high),
        low: dec(low),
        close: dec(close),
        volume: Decimal::ONE,
        close_time: (i as i64 + 1) * 60_000 - 1,
    }
}

#[async_trait]
impl MarketData for FakeExchange {
    async fn klines(&self, symbol: &Symbol, interval: &str, _limit: u16) -> Result<Vec<Kline>> {
        let market = self
            .markets
            .get(&symbol.0)
            .ok_or_else(|| anyhow!("unknown symbol {}", symbol))?;
        if interval == engine::DAY_INTERVAL {
            return Ok(vec![kline(0, market.day_high, market.day_low, market.day_low)]);
        }
        Ok(market
            .closes
            .iter()
            .enumerate()
            .map(|(i, c)| kline(i, *c, *c, *c))
            .collect())
    }

    async fn price(&self, symbol: &Symbol) -> Result<Decimal> {
        self.markets
            .get(&symbol.0)
            .and_then(|m| m.price)
            .map(dec)
            .ok_or_else(|| anyhow!("no price for {}", symbol))
    }
}

#[async_trait]
impl AccountSource for FakeExchange {
    async fn holdings(&self, _quote_asset: &str) -> Result<Vec<Holding>> {
        Ok(self.holdings.clone())
    }
}

fn holding(asset: &str, quantity: f64, average_price: Option<f64>) -> Holding {
    Holding {
        asset: asset.to_string(),
        symbol: Symbol::from_asset(asset, "USDT"),
        free: quantity,
        locked: 0.0,
        total: quantity,
        average_price,
        cost_price: average_price,
    }
}

fn zigzag(start: f64, step: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| start + step * i as f64 + if i % 2 == 0 { 0.5 } else { -0.5 })
        .collect()
}

struct Harness {
    engine: Engine,
    executor: Arc<DryRunExecutor>,
    notifier: Arc<MemoryNotifier>,
}

fn harness(exchange: FakeExchange) -> Harness {
    let exchange = Arc::new(exchange);
    let executor = Arc::new(DryRunExecutor::new());
    let notifier = Arc::new(MemoryNotifier::new());
    let services = Services {
        market: exchange.clone(),
        account: exchange,
        executor: executor.clone(),
        notifier: notifier.clone(),
    };
    let engine = Engine::new(EngineConfig::default(), services).unwrap();
    Harness {
        engine,
        executor,
        notifier,
    }
}

fn market(price: f64, closes: Vec<f64>, day_high: f64, day_low: f64) -> Market {
    Market {
        price: Some(price),
        closes,
        day_high,
        day_low,
    }
}

#[tokio::test]
async fn quiet_holdings_produce_no_alert() {
    let mut exchange = FakeExchange::default();
    exchange
        .markets
        .insert("BTCUSDT".into(), market(101.0, zigzag(90.0, 0.1, 80), 102.0, 99.0));
    exchange.holdings.push(holding("BTC", 1.0, Some(100.0)));
    let h = harness(exchange);

    let reports = h.engine.check_positions().await.unwrap();
    assert!(reports.is_empty());
    assert!(h.notifier.messages().await.is_empty());
    assert!(h.executor.journal().await.is_empty());
}

#[tokio::test]
async fn gain_at_day_high_takes_profit() {
    let mut exchange = FakeExchange::default();
    exchange
        .markets
        .insert("ETHUSDT".into(), market(200.0, zigzag(120.0, 1.0, 80), 200.0, 180.0));
    exchange.holdings.push(holding("ETH", 10.0, Some(100.0)));
    let h = harness(exchange);

    let reports = h.engine.check_positions().await.unwrap();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.prediction.day_high, Some(200.0));
    assert_eq!(report.prediction.day_low, Some(180.0));
    assert!(report.dca_plan.is_empty());
    match &report.order {
        Some(OrderOutcome::Executed(execution)) => {
            assert_eq!(execution.side, Side::Sell);
            assert_eq!(execution.quantity, Decimal::from(5));
        }
        other => panic!("expected an executed sell, got {:?}", other),
    }

    let journal = h.executor.journal().await;
    assert_eq!(journal.len(), 1);
    let messages = h.notifier.messages().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("#ETHUSDT"));
    assert!(messages[0].contains("Partial Take-Profit: Sold 5"));
}

#[tokio::test]
async fn small_holding_sell_is_vetoed() {
    let mut exchange = FakeExchange::default();
    exchange
        .markets
        .insert("SOLUSDT".into(), market(200.0, zigzag(120.0, 1.0, 80), 199.0, 180.0));
    exchange.holdings.push(holding("SOL", 2.0, Some(100.0)));
    let h = harness(exchange);

    let reports = h.engine.check_positions().await.unwrap();
    assert!(matches!(reports[0].order, Some(OrderOutcome::Vetoed(_))));
    assert!(h.executor.journal().await.is_empty());
    assert!(h.notifier.messages().await[0].contains("Order skipped:"));
}

#[tokio::test]
async fn loss_attaches_dca_plan() {
    let mut exchange = FakeExchange::default();
    exchange
        .markets
        .insert("ADAUSDT".into(), market(70.0, zigzag(110.0, -0.5, 80), 75.0, 69.0));
    exchange.holdings.push(holding("ADA", 10.0, Some(100.0)));
    let h = harness(exchange);

    let reports = h.engine.check_positions().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert!(!reports[0].dca_plan.is_empty());
    assert!(h.notifier.messages().await[0].contains("DCA Strategy for #ADAUSDT"));
}

#[tokio::test]
async fn failures_are_isolated_per_holding() {
    let mut exchange = FakeExchange::default();
    exchange.markets.insert(
        "XRPUSDT".into(),
        Market {
            price: None,
            closes: Vec::new(),
            day_high: 0.0,
            day_low: 0.0,
        },
    );
    exchange
        .markets
        .insert("ETHUSDT".into(), market(200.0, zigzag(120.0, 1.0, 80), 200.0, 180.0));
    exchange.holdings.push(holding("XRP", 100.0, Some(1.0)));
    exchange.holdings.push(holding("DOT", 100.0, None));
    exchange.holdings.push(holding("ETH", 10.0, Some(100.0)));
    let h = harness(exchange);

    let reports = h.engine.check_positions().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].holding.asset, "ETH");
}

#[tokio::test]
async fn summary_skips_unpriced_holdings() {
    let mut exchange = FakeExchange::default();
    exchange
        .markets
        .insert("ETHUSDT".into(), market(110.0, Vec::new(), 0.0, 0.0));
    exchange.markets.insert(
        "XRPUSDT".into(),
        Market {
            price: None,
            closes: Vec::new(),
            day_high: 0.0,
            day_low: 0.0,
        },
    );
    exchange.holdings.push(holding("ETH", 2.0, Some(100.0)));
    exchange.holdings.push(holding("XRP", 100.0, Some(1.0)));
    let h = harness(exchange);

    let summary = h.engine.summarize().await.unwrap();
    assert_eq!(summary.lines.len(), 1);
    assert!((summary.total_invested - 200.0).abs() < 1e-9);
    assert!((summary.total_value - 220.0).abs() < 1e-9);
    assert!((summary.total_change_pct - 10.0).abs() < 1e-9);

    let messages = h.notifier.messages().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("📊 *Account Balances Summary:*"));
    assert!(messages[0].contains("[#ETHUSDT]"));
}

#[tokio::test]
async fn run_stops_on_shutdown() {
    let h = harness(FakeExchange::default());
    h.engine.run(std::future::ready(())).await.unwrap();
}

#[test]
fn bad_summary_time_is_rejected() {
    let mut config = EngineConfig::default();
    config.trading.summary_time = "25:99".to_string();
    let exchange = Arc::new(FakeExchange::default());
    let services = Services {
        market: exchange.clone(),
        account: exchange,
        executor: Arc::new(DryRunExecutor::new()),
        notifier: Arc::new(MemoryNotifier::new()),
    };
    assert!(Engine::new(config, services).is_err());
}
