use sonic::prelude::*;

use crate::{focus, grid};

#[tokio::test]
async fn nop_test() -> anyhow::Result<()> {
    let mut session = ArraySession::builder(grid(2, 2)?).open(Nop::new()).await?;
    assert!(session.link_error().is_none());
    assert!(session.link().await.is_open());

    session.send([focus(0., 0., 0.1)]).await?;

    session.link().await.close().await?;
    let err = session.send([focus(0., 0., 0.1)]).await.unwrap_err();
    assert_eq!(SonicError::HardwareLink(LinkError::closed()), err);
    assert_eq!(Some(2), session.snapshot().map(|s| s.generation()));

    session.close().await?;
    Ok(())
}
