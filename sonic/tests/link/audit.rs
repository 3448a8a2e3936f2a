use sonic::prelude::*;

use crate::{focus, grid};

#[tokio::test]
async fn audit_test() -> anyhow::Result<()> {
    let mut session = ArraySession::builder(grid(4, 4)?)
        .open(Audit::new(AuditOption::default()))
        .await?;

    session.send([focus(0., 0., 0.15)]).await?;
    session.send([focus(0.02, 0., 0.15)]).await?;

    let snapshot = session
        .snapshot()
        .ok_or_else(|| anyhow::anyhow!("no snapshot"))?;
    let link = session.link().await;
    assert_eq!(2, link.frames().len());
    assert_eq!(Some(&snapshot.frame()), link.last_frame());
    assert_eq!(
        Some(snapshot.frame()),
        Frame::from_bytes(&link.frames()[1].to_bytes())
    );
    assert_eq!(
        vec![1, 2],
        link.iter()
            .map(|f| f.header().generation())
            .collect::<Vec<_>>()
    );
    Ok(())
}

#[tokio::test]
async fn break_down_and_repair() -> anyhow::Result<()> {
    let mut session = ArraySession::builder(grid(2, 2)?)
        .open(Audit::new(AuditOption {
            broken: true,
            ..Default::default()
        }))
        .await?;

    let err = session.send([focus(0., 0., 0.1)]).await.unwrap_err();
    assert_eq!(ErrorKind::HardwareLink, err.kind());
    assert_eq!(Some(1), session.inspector().generation());
    assert_eq!(4, session.excitations().map_or(0, |e| e.len()));

    session.link().await.repair();
    session.send([focus(0., 0., 0.1)]).await?;
    let link = session.link().await;
    assert_eq!(1, link.frames().len());
    assert_eq!(2, link.frames()[0].header().generation());
    Ok(())
}
