//! Automation-fingerprint masking.
//!
//! One script registered to run on every new document before page scripts
//! execute. Covers the properties naive bot detectors probe: webdriver
//! flag, languages, plugin enumeration, `window.chrome`, and WebGL vendor
//! strings.

use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::Page;
use tracing::debug;

const STEALTH_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', {
    get: () => false
});

Object.defineProperty(navigator, 'languages', {
    get: () => ['en-US', 'en']
});

(() => {
    const mockPlugins = [
        { name: 'Chrome PDF Plugin', description: 'Portable Document Format', filename: 'internal-pdf-viewer' },
        { name: 'Chrome PDF Viewer', description: '', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai' },
        { name: 'Native Client', description: '', filename: 'internal-nacl-plugin' }
    ];
    Object.defineProperty(navigator, 'plugins', {
        get: () => {
            const plugins = {};
            mockPlugins.forEach((plugin, i) => {
                plugins[i] = plugin;
                plugins[plugin.name] = plugin;
            });
            Object.defineProperty(plugins, 'length', { value: mockPlugins.length });
            return plugins;
        }
    });
})();

if (!window.chrome) {
    window.chrome = {};
}
if (!window.chrome.runtime) {
    window.chrome.runtime = {
        connect: () => ({
            onMessage: { addListener: () => {}, removeListener: () => {} },
            postMessage: () => {}
        })
    };
}

if (window.WebGLRenderingContext) {
    const getParameter = WebGLRenderingContext.prototype.getParameter;
    WebGLRenderingContext.prototype.getParameter = new Proxy(getParameter, {
        apply: function(target, ctx, args) {
            const param = (args && args[0]) || null;
            if (param === 37445) { return 'Intel Inc.'; }
            if (param === 37446) { return 'Intel Iris OpenGL Engine'; }
            return Reflect.apply(target, ctx, args);
        }
    });
}
"#;

/// Register the stealth script to run on every new document of this page.
pub async fn inject(page: &Page) -> Result<()> {
    page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
        .await?;
    debug!("stealth script registered");
    Ok(())
}
