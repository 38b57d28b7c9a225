use gtk::gio;
use gtk4 as gtk;

/// Non-blocking notice; the wheel keeps running.
pub fn alert(message: &str, detail: &str) {
    gtk::AlertDialog::builder()
        .message(message)
        .detail(detail)
        .modal(false)
        .build()
        .show(None::<&gtk::Window>);
}

/// Blocks until the user dismisses the dialog. Used for errors that end the process.
pub fn fatal(message: &str, detail: &str) {
    if gtk::init().is_err() {
        // no display to show it on; the log already has it
        return;
    }

    let main_loop = glib::MainLoop::new(None, false);
    let dialog = gtk::AlertDialog::builder()
        .message(message)
        .detail(detail)
        .buttons(["Quit"])
        .modal(true)
        .build();

    let ml = main_loop.clone();
    dialog.choose(None::<&gtk::Window>, None::<&gio::Cancellable>, move |_| {
        ml.quit();
    });
    main_loop.run();
}
