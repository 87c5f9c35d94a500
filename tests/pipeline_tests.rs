//! End-to-end tests for the collect → filter → summarize → select pipeline

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use dexscan::config::Thresholds;
    use dexscan::error::SourceError;
    use dexscan::oracle::{QuoteCollector, QuoteSource};
    use dexscan::persistence::ReportSink;
    use dexscan::scanner::{analyze, ScanSettings, Scanner};
    use dexscan::types::{Asset, CycleReport, DexSource, Quote, SourceOutcome};

    // ============================================================================
    // Test sources
    // ============================================================================

    /// Answers with a fixed price list, optionally after a delay
    struct StubSource {
        id: DexSource,
        prices: Vec<(&'static str, f64, f64)>,
        delay: Duration,
    }

    impl StubSource {
        fn new(id: DexSource, prices: Vec<(&'static str, f64, f64)>) -> Arc<dyn QuoteSource> {
            Arc::new(Self {
                id,
                prices,
                delay: Duration::ZERO,
            })
        }

        fn hanging(id: DexSource) -> Arc<dyn QuoteSource> {
            Arc::new(Self {
                id,
                prices: vec![("X", 1.0, 1.0)],
                delay: Duration::from_secs(30),
            })
        }
    }

    #[async_trait]
    impl QuoteSource for StubSource {
        fn id(&self) -> DexSource {
            self.id
        }

        async fn fetch_quotes(&self, _assets: &[Asset]) -> Result<Vec<Quote>, SourceError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self
                .prices
                .iter()
                .map(|(asset, price, liquidity)| Quote {
                    liquidity: *liquidity,
                    ..Quote::price_only(self.id, asset, *price, 1_700_000_000_000)
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct CapturingSink {
        reports: Mutex<Vec<CycleReport>>,
    }

    #[async_trait]
    impl ReportSink for CapturingSink {
        fn name(&self) -> &'static str {
            "capture"
        }

        async fn publish(&self, report: &CycleReport) -> anyhow::Result<()> {
            self.reports.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    fn x_asset() -> Vec<Asset> {
        vec![Asset::new("X", "x-mint")]
    }

    async fn collect_and_analyze(
        sources: Vec<Arc<dyn QuoteSource>>,
        assets: &[Asset],
    ) -> dexscan::scanner::Analysis {
        let collector = QuoteCollector::new(sources, Duration::from_millis(500));
        let collection = collector.collect_all(assets).await;
        analyze(&collection.quotes, assets, &Thresholds::default())
    }

    // ============================================================================
    // Scenarios
    // ============================================================================

    #[tokio::test]
    async fn test_three_sources_produce_one_route() {
        let sources = vec![
            StubSource::new(DexSource::Jupiter, vec![("X", 100.0, 50_000.0)]),
            StubSource::new(DexSource::Raydium, vec![("X", 101.0, 50_000.0)]),
            StubSource::new(DexSource::Orca, vec![("X", 102.0, 50_000.0)]),
        ];
        let analysis = collect_and_analyze(sources, &x_asset()).await;

        let summary = &analysis.summaries["X"];
        assert_eq!(summary.count, 3);
        assert!((summary.spread_pct - 2.0).abs() < 1e-9);
        assert!((summary.confidence - 0.836).abs() < 1e-9);

        assert_eq!(analysis.routes.len(), 1);
        let route = &analysis.routes[0];
        assert_eq!(route.buy.source, DexSource::Jupiter);
        assert_eq!(route.buy.price, 100.0);
        assert_eq!(route.sell.source, DexSource::Orca);
        assert_eq!(route.sell.price, 102.0);
        assert!((route.max_trade_size - 25.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_outlier_is_removed_before_spread() {
        let sources = vec![
            StubSource::new(DexSource::Jupiter, vec![("X", 10.0, 50_000.0)]),
            StubSource::new(DexSource::Raydium, vec![("X", 10.1, 50_000.0)]),
            StubSource::new(DexSource::Orca, vec![("X", 1000.0, 50_000.0)]),
        ];
        let analysis = collect_and_analyze(sources, &x_asset()).await;

        let summary = &analysis.summaries["X"];
        assert_eq!(summary.count, 2);
        assert!(!summary.sources.contains(&DexSource::Orca));
        assert!((summary.spread_pct - 1.0).abs() < 1e-9);

        // Still within the window, so the two agreeing venues form a route
        assert_eq!(analysis.routes.len(), 1);
        assert_eq!(analysis.routes[0].sell.price, 10.1);
    }

    #[tokio::test]
    async fn test_single_source_yields_no_route() {
        let sources = vec![StubSource::new(
            DexSource::Jupiter,
            vec![("X", 100.0, 10_000_000.0)],
        )];
        let analysis = collect_and_analyze(sources, &x_asset()).await;

        assert_eq!(analysis.summaries["X"].count, 1);
        assert_eq!(analysis.summaries["X"].confidence, 0.0);
        assert!(analysis.routes.is_empty());
    }

    #[tokio::test]
    async fn test_hanging_source_does_not_block_cycle() {
        let sources = vec![
            StubSource::new(DexSource::Jupiter, vec![("X", 100.0, 50_000.0)]),
            StubSource::new(DexSource::Raydium, vec![("X", 100.5, 50_000.0)]),
            StubSource::new(DexSource::Orca, vec![("X", 101.0, 50_000.0)]),
            StubSource::hanging(DexSource::Birdeye),
            StubSource::new(DexSource::DexScreener, vec![("X", 101.5, 50_000.0)]),
        ];
        let collector = QuoteCollector::new(sources, Duration::from_millis(200));

        let started = Instant::now();
        let collection = collector.collect_all(&x_asset()).await;
        assert!(started.elapsed() < Duration::from_secs(2));

        assert_eq!(collection.quotes.get("X").len(), 4);
        let timed_out: Vec<DexSource> = collection
            .statuses
            .iter()
            .filter(|s| s.outcome == SourceOutcome::TimedOut)
            .map(|s| s.source)
            .collect();
        assert_eq!(timed_out, vec![DexSource::Birdeye]);

        let analysis = analyze(&collection.quotes, &x_asset(), &Thresholds::default());
        assert_eq!(analysis.summaries["X"].count, 4);
        assert_eq!(analysis.routes.len(), 1);
    }

    #[tokio::test]
    async fn test_stablecoin_is_pinned_and_never_routed() {
        let assets = vec![Asset::stable("USDC", "usdc-mint")];
        let sources = vec![
            StubSource::new(DexSource::Jupiter, vec![("USDC", 0.97, 1_000_000.0)]),
            StubSource::new(DexSource::Orca, vec![("USDC", 1.03, 1_000_000.0)]),
        ];
        let analysis = collect_and_analyze(sources, &assets).await;

        let summary = &analysis.summaries["USDC"];
        assert_eq!(summary.min_price, 1.0);
        assert_eq!(summary.max_price, 1.0);
        assert_eq!(summary.spread_pct, 0.0);
        assert!(analysis.routes.is_empty());
    }

    #[tokio::test]
    async fn test_routes_ranked_across_assets() {
        let assets = vec![Asset::new("A", "a-mint"), Asset::new("B", "b-mint")];
        let sources = vec![
            StubSource::new(
                DexSource::Jupiter,
                vec![("A", 100.0, 50_000.0), ("B", 100.0, 50_000.0)],
            ),
            StubSource::new(
                DexSource::Orca,
                vec![("A", 101.0, 50_000.0), ("B", 104.0, 50_000.0)],
            ),
        ];
        let analysis = collect_and_analyze(sources, &assets).await;

        let order: Vec<&str> = analysis.routes.iter().map(|r| r.asset.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    // ============================================================================
    // Driver
    // ============================================================================

    #[tokio::test]
    async fn test_scanner_publishes_each_cycle() {
        let sink = Arc::new(CapturingSink::default());
        let sources = vec![
            StubSource::new(DexSource::Jupiter, vec![("X", 100.0, 50_000.0)]),
            StubSource::new(DexSource::Orca, vec![("X", 102.0, 50_000.0)]),
        ];
        let settings = ScanSettings {
            assets: vec![Asset::new("X", "x-mint"), Asset::new("Y", "y-mint")],
            thresholds: Thresholds::default(),
            poll_interval: Duration::from_millis(20),
            max_cycles: 2,
            shutdown_grace: Duration::from_secs(1),
        };
        let scanner = Arc::new(Scanner::new(
            settings,
            QuoteCollector::new(sources, Duration::from_millis(500)),
            vec![sink.clone()],
        ));

        scanner.run_until(std::future::pending()).await.unwrap();

        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].cycle, 1);
        assert_eq!(reports[1].cycle, 2);
        assert_eq!(reports[0].unpriced, vec!["Y".to_string()]);
        assert_eq!(reports[0].routes.len(), 1);
        assert!(reports[0].sources.iter().all(|s| s.is_ok()));
    }
}
