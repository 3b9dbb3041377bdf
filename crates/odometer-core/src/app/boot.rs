impl<S, D, St> OdometerApp<S, D, St>
where
    S: FrameSink,
    D: DelayNs,
    St: DistanceStore,
{
    pub async fn startup(&mut self) -> Result<(), S::Error> {
        debug!("app: startup sweep");
        self.engine.startup_sweep().await
    }

    /// Network never came up; the caller parks afterwards.
    pub fn network_failed(&mut self) -> Result<(), S::Error> {
        warn!("app: network unavailable");
        self.engine.display_text(ERROR_TEXT)
    }

    /// Shows the outcome of the single gear fetch.
    ///
    /// A fresh reading scrolls the gear name and `ip`, animates from the
    /// stored value, and persists the new one. A failed fetch falls back to the
    /// stored value, or [`ERROR_TEXT`] when there is none.
    pub async fn present(
        &mut self,
        fetched: Result<GearReading, FetchError>,
        ip: Ipv4Addr,
    ) -> Result<Presented, S::Error> {
        let reading = match fetched {
            Ok(reading) => reading,
            Err(err) => {
                warn!("app: gear fetch failed err={:?}", err);
                return self.present_fallback();
            }
        };

        info!(
            "app: gear name={} distance={:.1}",
            reading.name.as_str(),
            reading.distance.get()
        );

        self.engine.scroll_text(reading.name.as_str()).await?;
        self.engine.pause(self.config.scroll_pause_ms).await;
        self.engine.scroll_text(format_ip(ip).as_str()).await?;
        self.engine.pause(self.config.scroll_pause_ms).await;

        let plan = DistancePlan::for_reading(self.last_distance(), reading.distance);
        let presented = match plan {
            DistancePlan::CountUp(target) => {
                self.engine.count_up(target).await?;
                Presented::CountedUp(target)
            }
            DistancePlan::Update { old, new } => {
                let outcome = self.engine.animate_update(old, new).await?;
                Presented::Updated {
                    distance: new,
                    outcome,
                }
            }
        };

        if let Err(err) = self.store.save(plan.target()) {
            warn!("store: save failed err={:?}", err);
        }

        Ok(presented)
    }

    fn present_fallback(&mut self) -> Result<Presented, S::Error> {
        match self.last_distance() {
            Some(distance) => {
                info!("app: showing stored distance={:.1}", distance.get());
                self.engine.display_value(distance)?;
                Ok(Presented::Stale(distance))
            }
            None => {
                self.engine.display_text(ERROR_TEXT)?;
                Ok(Presented::Failed)
            }
        }
    }
}
