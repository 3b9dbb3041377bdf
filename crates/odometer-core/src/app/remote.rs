impl<S, D, St> OdometerApp<S, D, St>
where
    S: FrameSink,
    D: DelayNs,
    St: DistanceStore,
{
    /// Builds the reply for one raw control request.
    pub fn respond(&mut self, raw: &[u8]) -> Result<ControlReply, ControlError> {
        match control::classify_request(raw)? {
            ControlRequest::Restart => {
                info!("control: restart requested");
                Ok(ControlReply::Restart)
            }
            ControlRequest::Status => {
                debug!("control: status requested");
                Ok(ControlReply::Status(control::status_page(
                    self.last_distance(),
                )))
            }
        }
    }

    /// Scrolls the restart banner and waits; the caller resets afterwards.
    pub async fn announce_restart(&mut self) -> Result<(), S::Error> {
        self.engine.scroll_text(RESTART_BANNER).await?;
        self.engine.pause(self.config.restart_pause_ms).await;
        Ok(())
    }
}
